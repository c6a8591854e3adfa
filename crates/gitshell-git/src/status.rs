//! `git status --porcelain -z` parsing.

use serde::Serialize;

use crate::errors::ParseError;

/// One changed path from `status --porcelain -z`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    /// Index (staged) state code, e.g. `M`, `A`, `?`, or space.
    pub index: char,
    /// Work-tree state code.
    pub work_tree: char,
    /// Path relative to the repository root.
    pub path: String,
    /// Source path of a rename or copy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
}

impl StatusEntry {
    /// Untracked file (`??`).
    pub fn is_untracked(&self) -> bool {
        self.index == '?' && self.work_tree == '?'
    }

    /// Has staged changes.
    pub fn is_staged(&self) -> bool {
        !matches!(self.index, ' ' | '?' | '!')
    }
}

/// Parse `status --porcelain -z` output.
///
/// Records are NUL-terminated and paths are never quoted. A rename or copy
/// record is followed by a second record holding its source path.
///
/// # Errors
///
/// Returns `MalformedStatus` for a record shorter than `XY path`, or a
/// rename without its source path.
pub fn parse_porcelain(output: &str) -> Result<Vec<StatusEntry>, ParseError> {
    let mut records = output.split('\0').filter(|r| !r.is_empty());
    let mut entries = Vec::new();

    while let Some(record) = records.next() {
        let mut entry = parse_record(record)?;
        if is_rename_or_copy(entry.index) || is_rename_or_copy(entry.work_tree) {
            let from = records.next().ok_or_else(|| ParseError::MalformedStatus {
                line: record.to_string(),
            })?;
            entry.original_path = Some(from.to_string());
        }
        entries.push(entry);
    }

    Ok(entries)
}

fn is_rename_or_copy(code: char) -> bool {
    matches!(code, 'R' | 'C')
}

fn parse_record(record: &str) -> Result<StatusEntry, ParseError> {
    let malformed = || ParseError::MalformedStatus {
        line: record.to_string(),
    };

    let mut chars = record.chars();
    let index = chars.next().ok_or_else(malformed)?;
    let work_tree = chars.next().ok_or_else(malformed)?;
    let path = chars.as_str().strip_prefix(' ').ok_or_else(malformed)?;
    if path.is_empty() {
        return Err(malformed());
    }

    Ok(StatusEntry {
        index,
        work_tree,
        path: path.to_string(),
        original_path: None,
    })
}
