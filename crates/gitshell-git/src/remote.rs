//! Git remote parsing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::errors::ParseError;

static REMOTE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(.+?)\s+\(([A-Za-z]+)\)(?:\s+\[[^\]]*\])?$")
        .expect("REMOTE_LINE is a valid regex")
});

/// A git remote with its name and URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    /// Remote name (e.g., "origin", "upstream").
    pub name: String,
    /// URL from the last line listed for this remote.
    pub url: String,
    /// Fetch URL, if listed.
    pub fetch_url: Option<String>,
    /// Push URL, if listed.
    pub push_url: Option<String>,
}

impl Remote {
    /// Parse `git remote -v` output into remotes sorted by name.
    ///
    /// Fetch and push lines for the same name collapse into one record.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRemote` for a non-blank line that is not
    /// `<name> <url> (<role>)`, optionally followed by a partial-clone
    /// filter such as `[blob:none]`.
    pub fn parse_remotes(output: &str) -> Result<Vec<Self>, ParseError> {
        let mut remotes: BTreeMap<String, Self> = BTreeMap::new();

        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let caps = REMOTE_LINE
                .captures(line)
                .ok_or_else(|| ParseError::MalformedRemote {
                    line: line.to_string(),
                })?;
            let (name, url, role) = (&caps[1], &caps[2], &caps[3]);

            let remote = remotes.entry(name.to_string()).or_insert_with(|| Self {
                name: name.to_string(),
                url: String::new(),
                fetch_url: None,
                push_url: None,
            });
            remote.url = url.to_string();
            match role.to_ascii_lowercase().as_str() {
                "fetch" => remote.fetch_url = Some(url.to_string()),
                "push" => remote.push_url = Some(url.to_string()),
                _ => {}
            }
        }

        Ok(remotes.into_values().collect())
    }
}

/// Find a remote by its name.
pub fn find_remote_by_name<'a>(remotes: &'a [Remote], name: &str) -> Option<&'a Remote> {
    remotes.iter().find(|r| r.name == name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_should_collapse_fetch_and_push_lines() {
        let output = "origin\thttps://example.com/r.git (fetch)\n\
                      origin\thttps://example.com/r.git (push)\n";
        let remotes = Remote::parse_remotes(output).unwrap();
        assert_eq!(
            remotes,
            vec![Remote {
                name: "origin".to_string(),
                url: "https://example.com/r.git".to_string(),
                fetch_url: Some("https://example.com/r.git".to_string()),
                push_url: Some("https://example.com/r.git".to_string()),
            }]
        );
    }

    #[test]
    fn test_should_keep_last_url_per_name() {
        let output = "\
origin\thttps://example.com/user/repo.git (fetch)
origin\tgit@example.com:user/repo.git (push)";

        let remotes = Remote::parse_remotes(output).unwrap();
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].url, "git@example.com:user/repo.git");
        assert_eq!(
            remotes[0].fetch_url.as_deref(),
            Some("https://example.com/user/repo.git")
        );
        assert_eq!(
            remotes[0].push_url.as_deref(),
            Some("git@example.com:user/repo.git")
        );
    }

    #[test]
    fn test_should_sort_remotes_by_name() {
        let output = "\
upstream\thttps://example.com/org/repo.git (fetch)
origin\thttps://example.com/user/repo.git (fetch)
fork\t/srv/git/fork.git (fetch)";

        let remotes = Remote::parse_remotes(output).unwrap();
        let names: Vec<&str> = remotes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["fork", "origin", "upstream"]);
        assert_eq!(remotes[0].url, "/srv/git/fork.git");
    }

    #[test]
    fn test_should_accept_partial_clone_filter() {
        let output = "\
origin\thttps://example.com/r.git (fetch) [blob:none]
origin\thttps://example.com/r.git (push)
";
        let remotes = Remote::parse_remotes(output).unwrap();
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].url, "https://example.com/r.git");
        assert_eq!(
            remotes[0].fetch_url.as_deref(),
            Some("https://example.com/r.git")
        );
    }

    #[test]
    fn test_should_reject_unclosed_filter() {
        let output = "origin\thttps://example.com/r.git (fetch) [blob:none";
        assert!(Remote::parse_remotes(output).is_err());
    }

    #[test]
    fn test_should_handle_empty_input() {
        assert!(Remote::parse_remotes("").unwrap().is_empty());
        assert!(Remote::parse_remotes("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_should_reject_malformed_line() {
        let output = "origin\thttps://example.com/a.git (fetch)\nmalformed line";
        let err = Remote::parse_remotes(output).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedRemote {
                line: "malformed line".to_string()
            }
        );
    }

    #[test]
    fn test_should_reject_line_without_role() {
        assert!(Remote::parse_remotes("origin https://example.com/a.git").is_err());
    }

    #[test]
    fn test_should_find_remote_by_name() {
        let remotes = Remote::parse_remotes(
            "origin\thttps://example.com/a.git (fetch)\nupstream\thttps://example.com/b.git (fetch)",
        )
        .unwrap();
        let r = find_remote_by_name(&remotes, "upstream").unwrap();
        assert_eq!(r.url, "https://example.com/b.git");
        assert!(find_remote_by_name(&remotes, "nonexistent").is_none());
    }
}
