//! High-level operations on one repository directory.

use std::path::{Path, PathBuf};

use regex::RegexBuilder;
use tracing::{debug, info, instrument};

use crate::branch::{branch_names, head_branch};
use crate::errors::GitError;
use crate::log::{Commit, parse_log};
use crate::message::sanitize_message;
use crate::reachability::{ReachabilityCache, ReachabilityProbe};
use crate::remote::{Remote, find_remote_by_name};
use crate::runner::{GitCommand, GitRunner};
use crate::status::{StatusEntry, parse_porcelain};

/// Pinned so `format.pretty` in the user's config cannot change the layout
/// [`parse_log`] reads.
const LOG_FORMAT: &str = "--pretty=medium";

/// Format string that makes `git branch` print `<marker> <name>` per line.
const LOCAL_BRANCH_FORMAT: &str = "--format=%(HEAD) %(refname:short)";

/// Remote consulted by [`Repository::is_tracking`].
pub const TRACKING_REMOTE: &str = "origin";

/// A git repository addressed by directory.
///
/// Every call runs one git process against [`dir`](Self::dir); nothing is
/// cached between calls. Operations that need an existing repository fail
/// with [`GitError::NotARepository`] when `<dir>/.git` is missing. Branch,
/// remote, ref and author arguments starting with `-` are refused with
/// [`GitError::OptionLikeArgument`] before git is spawned.
#[derive(Debug, Clone)]
pub struct Repository {
    runner: GitRunner,
    dir: PathBuf,
}

impl Repository {
    /// Address `dir` through `runner`.
    pub fn new(runner: GitRunner, dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            dir: dir.into(),
        }
    }

    /// Address `dir` with the git found on PATH.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if git is not on PATH.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, GitError> {
        Ok(Self::new(GitRunner::new()?, dir))
    }

    /// Point at another directory.
    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.dir = dir.into();
        self
    }

    /// The repository directory as given.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The runner used for every command.
    pub fn runner(&self) -> &GitRunner {
        &self.runner
    }

    async fn run(&self, cmd: GitCommand) -> Result<String, GitError> {
        self.runner.run(&self.dir, &cmd).await
    }

    // Read operations

    /// Configured remotes, sorted by name.
    ///
    /// # Errors
    ///
    /// `NotARepository`, a git failure, or `Parse` for an unexpected line.
    pub async fn remotes(&self) -> Result<Vec<Remote>, GitError> {
        let output = self.run(GitCommand::new(["remote", "-v"])).await?;
        Ok(Remote::parse_remotes(&output)?)
    }

    /// Local branch names.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn branches(&self) -> Result<Vec<String>, GitError> {
        let output = self.local_listing().await?;
        Ok(branch_names(&output))
    }

    /// Remote-tracking branch names such as `origin/main`.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn remote_branches(&self) -> Result<Vec<String>, GitError> {
        let output = self
            .run(GitCommand::new(["branch", "-r", "--no-color"]).work_tree(false))
            .await?;
        Ok(branch_names(&output))
    }

    /// The checked-out branch, or `None` on a detached or unborn HEAD.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn head_branch(&self) -> Result<Option<String>, GitError> {
        let output = self.local_listing().await?;
        Ok(head_branch(&output))
    }

    /// Commits reachable from `head` (HEAD when `None`), newest first.
    ///
    /// # Errors
    ///
    /// `NotARepository`, a git failure (including a repository with no
    /// commits yet), or `Parse`.
    pub async fn commits(&self, head: Option<&str>) -> Result<Vec<Commit>, GitError> {
        let head = head.map(positional).transpose()?;
        let output = self.run(log_command(head)).await?;
        Ok(parse_log(&output)?)
    }

    /// Changed paths from `status --porcelain -z`, unquoted.
    ///
    /// # Errors
    ///
    /// `NotARepository`, a git failure, or `Parse`.
    pub async fn status_entries(&self) -> Result<Vec<StatusEntry>, GitError> {
        let output = self.run(GitCommand::new(["status", "--porcelain", "-z"])).await?;
        Ok(parse_porcelain(&output)?)
    }

    /// Human-readable `git status` output.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn status(&self) -> Result<String, GitError> {
        self.run(GitCommand::new(["status"])).await
    }

    async fn local_listing(&self) -> Result<String, GitError> {
        self.run(GitCommand::new(["branch", LOCAL_BRANCH_FORMAT])).await
    }

    // Mutating operations

    /// Add a remote.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure (for example, the name exists).
    pub async fn add_remote(&self, name: &str, url: &str) -> Result<String, GitError> {
        let (name, url) = (positional(name)?, positional(url)?);
        self.run(GitCommand::new(["remote", "add", name, url])).await
    }

    /// Switch to an existing local branch.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn checkout(&self, branch: &str) -> Result<String, GitError> {
        let branch = positional(branch)?;
        self.run(GitCommand::new(["checkout", branch, "-q"])).await
    }

    /// Create a local branch tracking the remote branch `branch`
    /// (`origin/feature`).
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn checkout_remote(&self, branch: &str) -> Result<String, GitError> {
        let branch = positional(branch)?;
        self.run(GitCommand::new(["checkout", "--track", branch])).await
    }

    /// Create `branch` at `commit` and switch to it.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn checkout_commit(&self, branch: &str, commit: &str) -> Result<String, GitError> {
        let (branch, commit) = (positional(branch)?, positional(commit)?);
        self.run(GitCommand::new(["checkout", "-b", branch, commit, "-q"]))
            .await
    }

    /// Force-delete a local branch.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn remove_branch(&self, branch: &str) -> Result<String, GitError> {
        let branch = positional(branch)?;
        self.run(GitCommand::new(["branch", "-D", branch])).await
    }

    /// Rename a local branch.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn rename_branch(&self, branch: &str, name: &str) -> Result<String, GitError> {
        let (branch, name) = (positional(branch)?, positional(name)?);
        self.run(GitCommand::new(["branch", "-m", branch, name])).await
    }

    /// Initialize a repository in [`dir`](Self::dir).
    ///
    /// Returns whether git reported the repository as initialized.
    ///
    /// # Errors
    ///
    /// A git failure or spawn error.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn init(&self) -> Result<bool, GitError> {
        let output = self.run(GitCommand::new(["init"]).check_repo(false)).await?;
        Ok(reports_initialized(&output))
    }

    /// Initialize a bare repository at [`dir`](Self::dir) itself.
    ///
    /// # Errors
    ///
    /// A git failure or spawn error.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn init_bare(&self) -> Result<bool, GitError> {
        let dir = self.dir.to_string_lossy().into_owned();
        let output = self
            .run(GitCommand::new(["init", "--bare"]).arg(dir).untargeted())
            .await?;
        Ok(reports_initialized(&output))
    }

    /// Stage everything and commit it.
    ///
    /// The message is sanitized first. A given name or email is stored in
    /// the repository config; `--author` is passed only when both are known.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure at any step (including "nothing to
    /// commit").
    #[instrument(skip(self, message))]
    pub async fn commit(
        &self,
        message: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<String, GitError> {
        let message = sanitize_message(message);
        let name = name.map(positional).transpose()?;
        let email = email.map(positional).transpose()?;

        self.run(GitCommand::new(["add", "-A"])).await?;
        if let Some(email) = email {
            self.run(GitCommand::new(["config", "user.email", email]))
                .await?;
        }
        if let Some(name) = name {
            self.run(GitCommand::new(["config", "user.name", name]))
                .await?;
        }

        let mut cmd = GitCommand::new(["commit", "-m"]).arg(message);
        if let (Some(name), Some(email)) = (name, email) {
            cmd = cmd.arg(format!("--author={name} <{email}>"));
        }
        self.run(cmd).await
    }

    /// Pull quietly. `branch` is only used together with `remote`.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn pull(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<String, GitError> {
        let cmd = with_remote_and_branch(GitCommand::new(["pull"]), remote, branch)?;
        self.run(cmd.quiet(true)).await
    }

    /// Push. `branch` is only used together with `remote`.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn push(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<String, GitError> {
        let cmd = with_remote_and_branch(GitCommand::new(["push"]), remote, branch)?;
        self.run(cmd).await
    }

    /// Discard work-tree changes to tracked files.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn clean(&self) -> Result<String, GitError> {
        self.run(GitCommand::new(["checkout", "--", "."])).await
    }

    /// Fetch one remote.
    ///
    /// # Errors
    ///
    /// `NotARepository` or a git failure.
    pub async fn fetch(&self, remote: &str) -> Result<String, GitError> {
        let remote = positional(remote)?;
        self.run(GitCommand::new(["fetch", remote])).await
    }

    /// Fetch every remote whose URL answers the probe.
    ///
    /// Returns whether at least one fetch ran. Stops at the first failing
    /// fetch.
    ///
    /// # Errors
    ///
    /// `NotARepository`, `Parse` on the remote listing, or a git failure.
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    pub async fn fetch_all<P: ReachabilityProbe>(
        &self,
        cache: &ReachabilityCache<P>,
    ) -> Result<bool, GitError> {
        let mut fetched = false;
        for remote in self.remotes().await? {
            let url = remote.fetch_url.as_deref().unwrap_or(&remote.url);
            if !cache.is_reachable(url).await {
                info!(remote = %remote.name, url, "skipping unreachable remote");
                continue;
            }
            self.fetch(&remote.name).await?;
            fetched = true;
        }
        Ok(fetched)
    }

    /// Whether `branch` both merges with and pushes to the same-named branch
    /// on `origin`.
    ///
    /// Returns `false` without asking git when there is no `origin` remote
    /// or it is unreachable.
    ///
    /// # Errors
    ///
    /// `NotARepository`, `Parse` on the remote listing, or a git failure.
    #[instrument(skip(self, cache))]
    pub async fn is_tracking<P: ReachabilityProbe>(
        &self,
        branch: &str,
        cache: &ReachabilityCache<P>,
    ) -> Result<bool, GitError> {
        let remotes = self.remotes().await?;
        let Some(origin) = find_remote_by_name(&remotes, TRACKING_REMOTE) else {
            debug!("no origin remote");
            return Ok(false);
        };
        if !cache.is_reachable(&origin.url).await {
            debug!(url = %origin.url, "origin unreachable");
            return Ok(false);
        }

        let output = self
            .run(GitCommand::new(["remote", "show", TRACKING_REMOTE]))
            .await?;
        Ok(tracks_branch(&output, branch))
    }
}

/// Refuse a value git would parse as an option instead of a name.
fn positional(value: &str) -> Result<&str, GitError> {
    if value.starts_with('-') {
        return Err(GitError::OptionLikeArgument {
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn log_command(head: Option<&str>) -> GitCommand {
    GitCommand::new(["log", "--no-color", "--date=iso-strict", LOG_FORMAT]).arg_opt(head)
}

fn with_remote_and_branch(
    cmd: GitCommand,
    remote: Option<&str>,
    branch: Option<&str>,
) -> Result<GitCommand, GitError> {
    Ok(match remote {
        Some(remote) => cmd
            .arg(positional(remote)?)
            .arg_opt(branch.map(positional).transpose()?),
        None => cmd,
    })
}

fn reports_initialized(output: &str) -> bool {
    output.to_lowercase().contains("initialized")
}

/// Whether `remote show` output lists `branch` under both pull and push
/// configuration.
fn tracks_branch(output: &str, branch: &str) -> bool {
    let escaped = regex::escape(branch);
    [
        format!(r" merges with remote {escaped}(?:\s|$)"),
        format!(r" pushes to {escaped}(?:\s|$)"),
    ]
    .iter()
    .all(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .is_ok_and(|re| re.is_match(output))
    })
}
