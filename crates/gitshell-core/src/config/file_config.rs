//! File-based configuration implementation.
//!
//! Reads/writes `config.yml` in the gitshell config directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Config, config_dir, env_key, option_for_key};
use crate::errors::ConfigError;

/// File-based configuration backed by a YAML file.
#[derive(Debug)]
pub struct FileConfig {
    config_path: PathBuf,
    data: ConfigData,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    git_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    probe_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reachability_ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assume_ssh_reachable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_email: Option<String>,
}

impl ConfigData {
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "git_path" => Some(&mut self.git_path),
            "probe_timeout" => Some(&mut self.probe_timeout),
            "reachability_ttl" => Some(&mut self.reachability_ttl),
            "assume_ssh_reachable" => Some(&mut self.assume_ssh_reachable),
            "user_name" => Some(&mut self.user_name),
            "user_email" => Some(&mut self.user_email),
            _ => None,
        }
    }

    fn value(&self, key: &str) -> Option<&String> {
        match key {
            "git_path" => self.git_path.as_ref(),
            "probe_timeout" => self.probe_timeout.as_ref(),
            "reachability_ttl" => self.reachability_ttl.as_ref(),
            "assume_ssh_reachable" => self.assume_ssh_reachable.as_ref(),
            "user_name" => self.user_name.as_ref(),
            "user_email" => self.user_email.as_ref(),
            _ => None,
        }
    }
}

impl FileConfig {
    /// Load configuration from the default config directory.
    ///
    /// A missing or empty file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_dir().join("config.yml"))
    }

    /// Load configuration from an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
                path: path.display().to_string(),
                source: e,
            })?;
            if content.trim().is_empty() {
                ConfigData::default()
            } else {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            ConfigData::default()
        };

        Ok(Self {
            config_path: path.to_path_buf(),
            data,
        })
    }

    /// Path this config reads from and writes to.
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Config for FileConfig {
    fn get(&self, key: &str) -> Option<String> {
        if let Ok(val) = std::env::var(env_key(key)) {
            return Some(val);
        }
        self.data.value(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        option_for_key(key)?.validate(value)?;
        if let Some(slot) = self.data.slot(key) {
            *slot = Some(value.to_string());
        }
        Ok(())
    }

    fn write(&self) -> Result<(), ConfigError> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::WriteFile {
                path: dir.display().to_string(),
                source: e,
            })?;
        }

        let yaml =
            serde_yaml::to_string(&self.data).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(&self.config_path, yaml).map_err(|e| ConfigError::WriteFile {
            path: self.config_path.display().to_string(),
            source: e,
        })
    }
}
