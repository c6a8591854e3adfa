//! Per-invocation state shared by all commands.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use gitshell_core::Config;
use gitshell_git::{GitRunner, HttpProbe, ReachabilityCache, Repository};
use serde::Serialize;

/// Configuration, target directory and output mode.
///
/// The git runner is resolved lazily so `config` commands work without git.
#[derive(Debug)]
pub struct Context {
    /// Loaded configuration.
    pub config: Box<dyn Config>,
    dir: PathBuf,
    json: bool,
}

impl Context {
    /// Create a context for `dir`.
    pub fn new(config: Box<dyn Config>, dir: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            config,
            dir: dir.into(),
            json,
        }
    }

    /// Whether output should be JSON.
    pub fn json(&self) -> bool {
        self.json
    }

    /// Open the target repository with the configured git binary.
    ///
    /// # Errors
    ///
    /// Returns an error if no git binary is configured or on PATH.
    pub fn repository(&self) -> Result<Repository> {
        let runner = match self.config.git_path() {
            Some(path) => GitRunner::with_git_path(path),
            None => GitRunner::new()?,
        };
        Ok(Repository::new(runner, &self.dir))
    }

    /// Build a reachability cache from the probe settings.
    ///
    /// # Errors
    ///
    /// Returns an error for unreadable timeout settings or if the HTTP
    /// client cannot be built.
    pub fn reachability_cache(&self) -> Result<ReachabilityCache<HttpProbe>> {
        let probe = HttpProbe::new(self.config.probe_timeout()?)
            .context("failed to build the reachability probe")?
            .assume_ssh_reachable(self.config.assume_ssh_reachable());
        Ok(ReachabilityCache::new(probe).with_ttl(self.config.reachability_ttl()?))
    }

    /// Print `value` as JSON, or `text` otherwise. Empty text prints nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn emit<T: Serialize + ?Sized>(
        &self,
        out: &mut dyn Write,
        value: &T,
        text: &str,
    ) -> Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        } else if !text.is_empty() {
            writeln!(out, "{text}")?;
        }
        Ok(())
    }
}
