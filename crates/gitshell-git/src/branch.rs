//! Branch listing parsing.
//!
//! Handles the two-column layout shared by `git branch` and
//! `git branch --format='%(HEAD) %(refname:short)'`: a `*` marker (or a
//! space) for the checked-out branch, a space, then the name.

/// Marker git prints in front of the checked-out branch.
pub const HEAD_MARKER: char = '*';

/// One entry of a branch listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    /// Branch name, or the detached-HEAD description.
    pub name: String,
    /// Whether the entry carried the head marker.
    pub is_head: bool,
}

impl BranchEntry {
    /// `(HEAD detached at …)` and similar descriptions.
    pub fn is_detached(&self) -> bool {
        self.name.starts_with('(')
    }
}

/// Parse a branch listing into entries, in listing order.
///
/// Blank lines are skipped. Symbolic alias lines such as
/// `origin/HEAD -> origin/main` are skipped too: they name no branch of
/// their own.
pub fn parse_listing(output: &str) -> Vec<BranchEntry> {
    output
        .lines()
        .filter_map(|line| {
            let is_head = line.starts_with(HEAD_MARKER);
            let name = line.trim_start_matches(HEAD_MARKER).trim();
            if name.is_empty() || name.contains(" -> ") {
                return None;
            }
            Some(BranchEntry {
                name: name.to_string(),
                is_head,
            })
        })
        .collect()
}

/// Branch names from a listing, excluding detached-HEAD descriptions.
pub fn branch_names(output: &str) -> Vec<String> {
    parse_listing(output)
        .into_iter()
        .filter(|e| !e.is_detached())
        .map(|e| e.name)
        .collect()
}

/// The checked-out branch, if the listing marks one.
///
/// Returns `None` when nothing is marked or HEAD is detached.
pub fn head_branch(output: &str) -> Option<String> {
    parse_listing(output)
        .into_iter()
        .find(|e| e.is_head)
        .filter(|e| !e.is_detached())
        .map(|e| e.name)
}
