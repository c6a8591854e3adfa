//! Git-related error types.

use std::path::PathBuf;

/// Errors from git operations.
///
/// The variants keep three outcomes apart: the command was never attempted
/// ([`GitError::NotARepository`], [`GitError::NotFound`]), git ran and reported
/// failure ([`GitError::CommandFailed`]), or git succeeded but its output could
/// not be read ([`GitError::Parse`]).
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// Git command failed with an exit code.
    #[error("git {command} failed: {message}")]
    CommandFailed {
        /// The git subcommand that failed.
        command: String,
        /// Error message from stderr.
        message: String,
        /// Process exit code, if available.
        exit_code: Option<i32>,
    },

    /// The repository has no metadata directory; nothing was run.
    #[error("not a git repository: {} has no .git directory", path.display())]
    NotARepository {
        /// Normalized repository path that was checked.
        path: PathBuf,
    },

    /// A branch, remote or ref argument that git would read as an option.
    #[error("refusing to pass {value:?} to git: it starts with '-'")]
    OptionLikeArgument {
        /// The rejected value.
        value: String,
    },

    /// Git binary not found.
    #[error("git executable not found in PATH")]
    NotFound,

    /// Git output did not have the expected shape.
    #[error("unparseable git output: {0}")]
    Parse(#[from] ParseError),

    /// I/O error from subprocess.
    #[error("git IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Get the exit code if this was a command failure.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Whether the command was skipped because the repository is missing.
    pub fn is_not_a_repository(&self) -> bool {
        matches!(self, Self::NotARepository { .. })
    }
}

/// Errors from parsing git's text output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A `remote -v` line without name, URL and role.
    #[error("malformed remote line: {line:?}")]
    MalformedRemote {
        /// The offending line.
        line: String,
    },

    /// A commit entry without a required header.
    #[error("commit {hash} has no {field} header")]
    MissingField {
        /// Commit hash.
        hash: String,
        /// Missing header name.
        field: &'static str,
    },

    /// A commit date that matches no known format.
    #[error("commit {hash} has an unreadable date {value:?}")]
    InvalidDate {
        /// Commit hash.
        hash: String,
        /// Raw date text.
        value: String,
    },

    /// Text where a record header was expected.
    #[error("unexpected text before first record: {line:?}")]
    UnexpectedText {
        /// The offending line.
        line: String,
    },

    /// A `status --porcelain` record that is too short or incomplete.
    #[error("malformed status record: {line:?}")]
    MalformedStatus {
        /// The offending line.
        line: String,
    },
}
