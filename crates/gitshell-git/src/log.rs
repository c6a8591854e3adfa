//! Commit log parsing.
//!
//! Reads the default `git log` layout:
//!
//! ```text
//! commit <hash>
//! Merge: <parent> <parent>
//! Author: <name> <<email>>
//! Date:   <date>
//!
//!     <message>
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::Serialize;

use crate::errors::ParseError;

static COMMIT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^commit ([0-9a-fA-F]{4,64})(?:\s.*)?$").expect("COMMIT_HEADER is a valid regex")
});

/// Date layouts git may print, tried after RFC 3339.
const DATE_FORMATS: &[&str] = &[
    "%a %b %e %H:%M:%S %Y %z",
    "%a %b %d %H:%M:%S %Y %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M:%S %z",
];

/// Indentation git puts in front of message lines.
const MESSAGE_INDENT: &str = "    ";

/// A git commit with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Commit hash as printed.
    pub hash: String,
    /// Author as printed (`Name <email>`).
    pub author: String,
    /// Author date in the commit's own offset.
    pub date: DateTime<FixedOffset>,
    /// Message with indentation removed, trimmed.
    pub message: String,
    /// Parent hashes from a `Merge:` header; empty for ordinary commits.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl Commit {
    /// The date as `YYYY-MM-DD HH:MM:SS`.
    pub fn normalized_date(&self) -> String {
        self.date.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// First line of the message.
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Parse `git log` output into commits, newest first as listed.
///
/// # Errors
///
/// - `UnexpectedText` if non-blank text precedes the first `commit` line.
/// - `MissingField` if an entry lacks `Author:` or `Date:`.
/// - `InvalidDate` if a date matches no known layout.
pub fn parse_log(output: &str) -> Result<Vec<Commit>, ParseError> {
    let mut commits = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in output.lines() {
        if let Some(caps) = COMMIT_HEADER.captures(line) {
            if let Some((hash, body)) = current.take() {
                commits.push(parse_entry(hash, &body)?);
            }
            current = Some((caps[1].to_string(), Vec::new()));
            continue;
        }

        match current.as_mut() {
            Some((_, body)) => body.push(line),
            None if line.trim().is_empty() => {}
            None => {
                return Err(ParseError::UnexpectedText {
                    line: line.to_string(),
                });
            }
        }
    }

    if let Some((hash, body)) = current {
        commits.push(parse_entry(hash, &body)?);
    }

    Ok(commits)
}

fn parse_entry(hash: String, body: &[&str]) -> Result<Commit, ParseError> {
    let split = body
        .iter()
        .position(|l| l.trim().is_empty())
        .unwrap_or(body.len());
    let (headers, message_lines) = body.split_at(split);

    let mut author = None;
    let mut raw_date = None;
    let mut parents = Vec::new();

    for header in headers {
        let Some((key, value)) = header.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "Author" => author = Some(value.to_string()),
            "Date" => raw_date = Some(value),
            "Merge" => parents = value.split_whitespace().map(String::from).collect(),
            _ => {}
        }
    }

    let author = author.ok_or_else(|| ParseError::MissingField {
        hash: hash.clone(),
        field: "Author",
    })?;
    let raw_date = raw_date.ok_or_else(|| ParseError::MissingField {
        hash: hash.clone(),
        field: "Date",
    })?;
    let date = parse_date(raw_date).ok_or_else(|| ParseError::InvalidDate {
        hash: hash.clone(),
        value: raw_date.to_string(),
    })?;

    let message = message_lines
        .iter()
        .map(|l| l.strip_prefix(MESSAGE_INDENT).unwrap_or(l))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    Ok(Commit {
        hash,
        author,
        date,
        message,
        parents,
    })
}

/// Parse a date in any layout git prints for `--date=iso-strict`,
/// `--date=iso`, `--date=rfc` or the default.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    })
}
