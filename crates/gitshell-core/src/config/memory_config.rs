//! In-memory configuration for testing.
//!
//! [`MemoryConfig`] implements [`Config`] without touching the filesystem or
//! the environment, so tests get deterministic settings.

use std::collections::HashMap;

use super::{Config, option_for_key};
use crate::errors::ConfigError;

/// In-memory configuration.
///
/// # Examples
///
/// ```
/// use gitshell_core::config::{Config, MemoryConfig};
///
/// let config = MemoryConfig::new().with("user_name", "Ada");
/// assert_eq!(config.user_name().as_deref(), Some("Ada"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryConfig {
    values: HashMap<String, String>,
}

impl MemoryConfig {
    /// Create a new empty in-memory configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter that skips validation.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl Config for MemoryConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        option_for_key(key)?.validate(value)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn write(&self) -> Result<(), ConfigError> {
        // Nothing to persist.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::config::CONFIG_OPTIONS;

    #[test]
    fn test_should_use_defaults_on_empty_config() {
        let cfg = MemoryConfig::new();
        assert!(cfg.git_path().is_none());
        assert_eq!(cfg.probe_timeout().unwrap(), Duration::from_secs(2));
        assert_eq!(cfg.reachability_ttl().unwrap(), None);
        assert!(!cfg.assume_ssh_reachable());
        assert!(cfg.user_name().is_none());
        assert!(cfg.user_email().is_none());
    }

    #[test]
    fn test_should_set_and_get() {
        let mut cfg = MemoryConfig::new();
        cfg.set("user_email", "ada@example.com").unwrap();
        assert_eq!(cfg.get("user_email").as_deref(), Some("ada@example.com"));
        assert_eq!(cfg.user_email().as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_should_reject_unknown_key_on_set() {
        let mut cfg = MemoryConfig::new();
        assert!(matches!(
            cfg.set("pager", "less"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_should_treat_empty_strings_as_unset() {
        let cfg = MemoryConfig::new()
            .with("git_path", "")
            .with("user_name", "");
        assert!(cfg.git_path().is_none());
        assert!(cfg.user_name().is_none());
    }

    #[test]
    fn test_should_read_typed_values() {
        let cfg = MemoryConfig::new()
            .with("git_path", "/usr/bin/git")
            .with("probe_timeout", "7")
            .with("reachability_ttl", "300")
            .with("assume_ssh_reachable", "true");
        assert_eq!(cfg.git_path(), Some(PathBuf::from("/usr/bin/git")));
        assert_eq!(cfg.probe_timeout().unwrap(), Duration::from_secs(7));
        assert_eq!(
            cfg.reachability_ttl().unwrap(),
            Some(Duration::from_secs(300))
        );
        assert!(cfg.assume_ssh_reachable());
    }

    #[test]
    fn test_should_surface_unvalidated_bad_number() {
        let cfg = MemoryConfig::new().with("probe_timeout", "later");
        assert!(matches!(
            cfg.probe_timeout(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_should_report_current_values() {
        let cfg = MemoryConfig::new().with("user_name", "Ada");
        let values: Vec<(&str, String)> = CONFIG_OPTIONS
            .iter()
            .map(|o| (o.key, o.current_value(&cfg)))
            .collect();
        assert!(values.contains(&("user_name", "Ada".to_string())));
        assert!(values.contains(&("probe_timeout", "2".to_string())));
    }
}
