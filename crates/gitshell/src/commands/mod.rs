//! Subcommands and their rendering.

pub mod config;

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use gitshell_git::{Commit, Remote, Repository, StatusEntry};
use serde_json::json;

use crate::context::Context;
use crate::errors::NegativeResult;

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the working tree status.
    Status {
        /// Machine-readable `XY path` lines.
        #[arg(long)]
        porcelain: bool,
    },
    /// List local branches.
    Branches {
        /// List remote-tracking branches instead.
        #[arg(short, long)]
        remote: bool,
    },
    /// Print the checked-out branch.
    Head,
    /// Show commit history.
    Log {
        /// Start from this branch or commit instead of HEAD.
        head: Option<String>,
    },
    /// List remotes.
    Remotes,
    /// Add a remote.
    RemoteAdd {
        /// Remote URL or path.
        url: String,
        /// Remote name.
        #[arg(long, default_value = "origin")]
        name: String,
    },
    /// Switch branches.
    Checkout(CheckoutArgs),
    /// Force-delete a local branch.
    BranchDelete {
        /// Branch to delete.
        branch: String,
    },
    /// Rename a local branch.
    BranchRename {
        /// Current name.
        old: String,
        /// New name.
        new: String,
    },
    /// Create a repository in the target directory.
    Init {
        /// Create a bare repository.
        #[arg(long)]
        bare: bool,
    },
    /// Stage everything and commit.
    Commit(CommitArgs),
    /// Pull from a remote.
    Pull(RemoteArgs),
    /// Push to a remote.
    Push(RemoteArgs),
    /// Fetch one remote, or every reachable remote when none is given.
    Fetch {
        /// Remote to fetch.
        remote: Option<String>,
    },
    /// Check whether a branch tracks the same branch on origin.
    Tracking {
        /// Local branch name.
        branch: String,
    },
    /// Discard work-tree changes to tracked files.
    Clean,
    /// Manage gitshell configuration.
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Arguments for `checkout`.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Branch to switch to; the remote branch with `--track`; the start
    /// commit with `-b`.
    target: String,
    /// Create a local branch tracking the remote branch `target`.
    #[arg(long, conflicts_with = "new_branch")]
    track: bool,
    /// Create this branch at commit `target`.
    #[arg(short = 'b', value_name = "NEW_BRANCH")]
    new_branch: Option<String>,
}

/// Arguments for `commit`.
#[derive(Debug, Args)]
pub struct CommitArgs {
    /// Commit message; characters other than letters, digits, whitespace,
    /// `_`, `-` and `:` are dropped.
    #[arg(short, long)]
    message: String,
    /// Author name (defaults to the `user_name` setting).
    #[arg(long)]
    author_name: Option<String>,
    /// Author email (defaults to the `user_email` setting).
    #[arg(long)]
    author_email: Option<String>,
}

/// Remote and branch for `pull`/`push`.
#[derive(Debug, Args)]
pub struct RemoteArgs {
    /// Remote name.
    remote: Option<String>,
    /// Branch; only used together with a remote.
    branch: Option<String>,
}

impl Commands {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns git and configuration errors, or [`NegativeResult`] when the
    /// operation answered "no".
    pub async fn run(self, ctx: &mut Context, out: &mut dyn Write) -> Result<()> {
        match self {
            Self::Config(cmd) => cmd.run(ctx, out),
            cmd => {
                let repo = ctx.repository()?;
                cmd.run_in_repo(&repo, ctx, out).await
            }
        }
    }

    async fn run_in_repo(
        self,
        repo: &Repository,
        ctx: &mut Context,
        out: &mut dyn Write,
    ) -> Result<()> {
        match self {
            Self::Status { porcelain: false } => {
                let text = repo.status().await?;
                ctx.emit(out, &text, &text)
            }
            Self::Status { porcelain: true } => {
                let entries = repo.status_entries().await?;
                ctx.emit(out, &entries, &render_status(&entries))
            }
            Self::Branches { remote } => {
                let branches = if remote {
                    repo.remote_branches().await?
                } else {
                    repo.branches().await?
                };
                ctx.emit(out, &branches, &branches.join("\n"))
            }
            Self::Head => match repo.head_branch().await? {
                Some(head) => ctx.emit(out, &head, &head),
                None => Err(NegativeResult("HEAD is detached or unborn".to_string()).into()),
            },
            Self::Log { head } => {
                let commits = repo.commits(head.as_deref()).await?;
                ctx.emit(out, &commits, &render_log(&commits))
            }
            Self::Remotes => {
                let remotes = repo.remotes().await?;
                ctx.emit(out, &remotes, &render_remotes(&remotes))
            }
            Self::RemoteAdd { url, name } => {
                let text = repo.add_remote(&name, &url).await?;
                ctx.emit(out, &text, &text)
            }
            Self::Checkout(args) => {
                let text = match (args.track, args.new_branch) {
                    (true, _) => repo.checkout_remote(&args.target).await?,
                    (false, Some(branch)) => repo.checkout_commit(&branch, &args.target).await?,
                    (false, None) => repo.checkout(&args.target).await?,
                };
                ctx.emit(out, &text, &text)
            }
            Self::BranchDelete { branch } => {
                let text = repo.remove_branch(&branch).await?;
                ctx.emit(out, &text, &text)
            }
            Self::BranchRename { old, new } => {
                let text = repo.rename_branch(&old, &new).await?;
                ctx.emit(out, &text, &text)
            }
            Self::Init { bare } => {
                let initialized = if bare {
                    repo.init_bare().await?
                } else {
                    repo.init().await?
                };
                outcome(ctx, out, initialized, "git did not report a new repository")
            }
            Self::Commit(args) => {
                let name = args.author_name.or_else(|| ctx.config.user_name());
                let email = args.author_email.or_else(|| ctx.config.user_email());
                let text = repo
                    .commit(&args.message, name.as_deref(), email.as_deref())
                    .await?;
                ctx.emit(out, &text, &text)
            }
            Self::Pull(args) => {
                let text = repo
                    .pull(args.remote.as_deref(), args.branch.as_deref())
                    .await?;
                ctx.emit(out, &text, &text)
            }
            Self::Push(args) => {
                let text = repo
                    .push(args.remote.as_deref(), args.branch.as_deref())
                    .await?;
                ctx.emit(out, &text, &text)
            }
            Self::Fetch {
                remote: Some(remote),
            } => {
                let text = repo.fetch(&remote).await?;
                ctx.emit(out, &text, &text)
            }
            Self::Fetch { remote: None } => {
                let cache = ctx.reachability_cache()?;
                let fetched = repo.fetch_all(&cache).await?;
                outcome(ctx, out, fetched, "no reachable remote to fetch")
            }
            Self::Tracking { branch } => {
                let cache = ctx.reachability_cache()?;
                let tracking = repo.is_tracking(&branch, &cache).await?;
                outcome(ctx, out, tracking, &format!("{branch} is not tracking origin"))
            }
            Self::Clean => {
                let text = repo.clean().await?;
                ctx.emit(out, &text, &text)
            }
            Self::Config(cmd) => cmd.run(ctx, out),
        }
    }
}

/// Report a yes/no answer; "no" becomes a [`NegativeResult`].
fn outcome(ctx: &Context, out: &mut dyn Write, ok: bool, negative: &str) -> Result<()> {
    if ctx.json() {
        ctx.emit(out, &json!({ "ok": ok }), "")?;
    }
    if ok {
        Ok(())
    } else {
        Err(NegativeResult(negative.to_string()).into())
    }
}

fn render_status(entries: &[StatusEntry]) -> String {
    entries
        .iter()
        .map(|e| match &e.original_path {
            Some(from) => format!("{}{} {from} -> {}", e.index, e.work_tree, e.path),
            None => format!("{}{} {}", e.index, e.work_tree, e.path),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_log(commits: &[Commit]) -> String {
    commits
        .iter()
        .map(|c| {
            let short = c.hash.get(..7).unwrap_or(&c.hash);
            format!("{short} {} {} {}", c.normalized_date(), c.author, c.title())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_remotes(remotes: &[Remote]) -> String {
    remotes
        .iter()
        .map(|r| format!("{}\t{}", r.name, r.url))
        .collect::<Vec<_>>()
        .join("\n")
}
