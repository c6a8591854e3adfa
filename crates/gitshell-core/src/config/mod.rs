//! Configuration system for gitshell.
//!
//! Settings live in `config.yml` inside the config directory. Every key can
//! be overridden by a `GITSHELL_<KEY>` environment variable.

mod file_config;
mod memory_config;

use std::path::PathBuf;
use std::time::Duration;

pub use file_config::FileConfig;
pub use memory_config::MemoryConfig;

use crate::errors::ConfigError;

/// Configuration directory path (usually ~/.config/gitshell).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GITSHELL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir().map_or_else(
        || {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("gitshell")
        },
        |d| d.join("gitshell"),
    )
}

/// Configuration trait for accessing settings.
pub trait Config: Send + Sync + std::fmt::Debug {
    /// Get a config value, if one is set.
    fn get(&self, key: &str) -> Option<String>;

    /// Set a config value after validating it against [`CONFIG_OPTIONS`].
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys or values the key does not accept.
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Write config to its backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be saved.
    fn write(&self) -> Result<(), ConfigError>;

    /// Get a config value, falling back to its default.
    fn get_or_default(&self, key: &str) -> String {
        self.get(key)
            .unwrap_or_else(|| default_for_key(key).to_string())
    }

    /// Explicit git binary. `None` means look it up on PATH.
    fn git_path(&self) -> Option<PathBuf> {
        self.get("git_path")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    /// Connect timeout of the reachability probe.
    fn probe_timeout(&self) -> Result<Duration, ConfigError> {
        let value = self.get_or_default("probe_timeout");
        parse_seconds("probe_timeout", &value)
    }

    /// How long a reachability result stays valid. `None` means forever.
    fn reachability_ttl(&self) -> Result<Option<Duration>, ConfigError> {
        let value = self.get_or_default("reachability_ttl");
        if value.is_empty() {
            return Ok(None);
        }
        parse_seconds("reachability_ttl", &value).map(Some)
    }

    /// Treat remotes that cannot be probed over HTTP as reachable.
    fn assume_ssh_reachable(&self) -> bool {
        self.get_or_default("assume_ssh_reachable") == "true"
    }

    /// Default author name for commits.
    fn user_name(&self) -> Option<String> {
        self.get("user_name").filter(|v| !v.is_empty())
    }

    /// Default author email for commits.
    fn user_email(&self) -> Option<String> {
        self.get("user_email").filter(|v| !v.is_empty())
    }
}

/// Shape of the values a config key accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Any string.
    Text,
    /// Whole seconds; empty is allowed when the default is empty.
    Seconds,
    /// One of the `allowed_values`.
    Choice,
}

/// Known configuration keys with descriptions and allowed values.
pub static CONFIG_OPTIONS: &[ConfigOption] = &[
    ConfigOption {
        key: "git_path",
        description: "path to the git executable, empty to search PATH",
        kind: ValueKind::Text,
        allowed_values: &[],
        default_value: "",
    },
    ConfigOption {
        key: "probe_timeout",
        description: "connect timeout in seconds for remote reachability checks",
        kind: ValueKind::Seconds,
        allowed_values: &[],
        default_value: "2",
    },
    ConfigOption {
        key: "reachability_ttl",
        description: "seconds a reachability result is cached, empty to cache forever",
        kind: ValueKind::Seconds,
        allowed_values: &[],
        default_value: "",
    },
    ConfigOption {
        key: "assume_ssh_reachable",
        description: "treat remotes that cannot be probed over HTTP as reachable",
        kind: ValueKind::Choice,
        allowed_values: &["true", "false"],
        default_value: "false",
    },
    ConfigOption {
        key: "user_name",
        description: "author name used by commit when none is given",
        kind: ValueKind::Text,
        allowed_values: &[],
        default_value: "",
    },
    ConfigOption {
        key: "user_email",
        description: "author email used by commit when none is given",
        kind: ValueKind::Text,
        allowed_values: &[],
        default_value: "",
    },
];

/// A known configuration option.
#[derive(Debug)]
pub struct ConfigOption {
    /// Config key name.
    pub key: &'static str,
    /// Description of what this option does.
    pub description: &'static str,
    /// Value shape.
    pub kind: ValueKind,
    /// Valid values for [`ValueKind::Choice`].
    pub allowed_values: &'static [&'static str],
    /// Default value.
    pub default_value: &'static str,
}

impl ConfigOption {
    /// Get the current value from config, or the default.
    pub fn current_value(&self, config: &dyn Config) -> String {
        config.get_or_default(self.key)
    }

    /// Check a candidate value against this option.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if the value has the wrong shape.
    pub fn validate(&self, value: &str) -> Result<(), ConfigError> {
        match self.kind {
            ValueKind::Text => Ok(()),
            ValueKind::Seconds if value.is_empty() && self.default_value.is_empty() => Ok(()),
            ValueKind::Seconds => parse_seconds(self.key, value).map(|_| ()),
            ValueKind::Choice if self.allowed_values.contains(&value) => Ok(()),
            ValueKind::Choice => Err(ConfigError::InvalidValue {
                key: self.key.to_string(),
                value: value.to_string(),
                reason: format!("valid values are {}", self.allowed_values.join(", ")),
            }),
        }
    }
}

/// Look up a known option.
///
/// # Errors
///
/// Returns `UnknownKey` if `key` is not in [`CONFIG_OPTIONS`].
pub fn option_for_key(key: &str) -> Result<&'static ConfigOption, ConfigError> {
    CONFIG_OPTIONS
        .iter()
        .find(|o| o.key == key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
}

/// Default configuration values.
pub fn default_for_key(key: &str) -> &'static str {
    CONFIG_OPTIONS
        .iter()
        .find(|o| o.key == key)
        .map_or("", |o| o.default_value)
}

/// Environment variable that overrides `key`.
pub fn env_key(key: &str) -> String {
    format!("GITSHELL_{}", key.to_uppercase())
}

fn parse_seconds(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a whole number of seconds".to_string(),
        })
}
