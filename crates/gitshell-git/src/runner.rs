//! Runs git against an explicit repository directory.
//!
//! Every command is rewritten to carry `--git-dir=<repo>/.git` and, unless
//! disabled, `--work-tree=<repo>`, so the caller's current directory never
//! matters.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument};

use crate::errors::GitError;

/// Name of the metadata directory inside a work tree.
pub const METADATA_DIR: &str = ".git";

/// A git invocation: arguments plus how to target the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    args: Vec<String>,
    check_repo: bool,
    quiet: bool,
    work_tree: bool,
    target_repo: bool,
}

impl GitCommand {
    /// Create a command from git arguments (without the `git` program name).
    ///
    /// Defaults: the metadata directory must exist, the work tree is passed,
    /// quiet mode is off.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            check_repo: true,
            quiet: false,
            work_tree: true,
            target_repo: true,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append an argument when present.
    #[must_use]
    pub fn arg_opt(self, arg: Option<&str>) -> Self {
        match arg {
            Some(a) => self.arg(a),
            None => self,
        }
    }

    /// Require `<repo>/.git` to exist before running.
    #[must_use]
    pub fn check_repo(mut self, on: bool) -> Self {
        self.check_repo = on;
        self
    }

    /// Append `--quiet` after the arguments.
    #[must_use]
    pub fn quiet(mut self, on: bool) -> Self {
        self.quiet = on;
        self
    }

    /// Pass `--work-tree=<repo>`.
    #[must_use]
    pub fn work_tree(mut self, on: bool) -> Self {
        self.work_tree = on;
        self
    }

    /// Run without `--git-dir`/`--work-tree` and without the existence check.
    #[must_use]
    pub fn untargeted(mut self) -> Self {
        self.target_repo = false;
        self.check_repo = false;
        self.work_tree = false;
        self
    }

    /// The git subcommand (first argument).
    pub fn subcommand(&self) -> &str {
        self.args.first().map_or("", String::as_str)
    }

    /// The arguments as given.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Full argument list for a normalized repository path.
    pub fn render(&self, repo: &Path) -> Vec<OsString> {
        let mut out = Vec::with_capacity(self.args.len() + 3);
        if self.target_repo {
            let mut git_dir = OsString::from("--git-dir=");
            git_dir.push(metadata_dir(repo));
            out.push(git_dir);

            if self.work_tree {
                let mut work_tree = OsString::from("--work-tree=");
                work_tree.push(repo);
                out.push(work_tree);
            }
        }
        out.extend(self.args.iter().map(OsString::from));
        if self.quiet {
            out.push(OsString::from("--quiet"));
        }
        out
    }
}

/// Collapse repeated separators and drop a trailing separator.
///
/// An empty path becomes `.`.
pub fn normalize_repo_path(dir: &Path) -> PathBuf {
    let normalized: PathBuf = dir
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Metadata directory of a (normalized) repository path.
pub fn metadata_dir(repo: &Path) -> PathBuf {
    repo.join(METADATA_DIR)
}

/// Executes git commands.
#[derive(Debug, Clone)]
pub struct GitRunner {
    git_path: PathBuf,
}

impl GitRunner {
    /// Create a runner using the git found on PATH.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if git is not on PATH.
    pub fn new() -> Result<Self, GitError> {
        let git_path = which::which("git").map_err(|_| GitError::NotFound)?;
        Ok(Self { git_path })
    }

    /// Create a runner for an explicit git binary.
    pub fn with_git_path(path: impl Into<PathBuf>) -> Self {
        Self {
            git_path: path.into(),
        }
    }

    /// Path of the git binary.
    pub fn git_path(&self) -> &Path {
        &self.git_path
    }

    /// Run `cmd` against the repository at `repo`.
    ///
    /// Returns stdout with trailing whitespace removed. Leading whitespace is
    /// kept because several listings encode state in their first columns.
    ///
    /// # Errors
    ///
    /// - `NotARepository` if the existence check is on and `<repo>/.git` is
    ///   missing; git is not spawned.
    /// - `CommandFailed` with stderr if git exits non-zero.
    /// - `Io` if the process cannot be spawned.
    #[instrument(skip(self, cmd), fields(repo = %repo.display(), args = ?cmd.args()))]
    pub async fn run(&self, repo: &Path, cmd: &GitCommand) -> Result<String, GitError> {
        let repo = normalize_repo_path(repo);

        if cmd.check_repo && !metadata_dir(&repo).is_dir() {
            debug!("metadata directory missing, not running git");
            return Err(GitError::NotARepository { path: repo });
        }

        let args = cmd.render(&repo);
        debug!(?args, "running git");

        let output = Command::new(&self.git_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(exit_code = ?output.status.code(), "git failed");
            return Err(GitError::CommandFailed {
                command: cmd.subcommand().to_string(),
                message: stderr.trim().to_string(),
                exit_code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string())
    }
}
