//! Core error types for gitshell.

/// Configuration-specific errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path of the config file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write config file.
    #[error("failed to write config file {path}: {source}")]
    WriteFile {
        /// Path of the config file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse config.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Key is not a known configuration option.
    #[error("unknown config key {0:?}")]
    UnknownKey(String),

    /// Value rejected for a known key.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Config key.
        key: String,
        /// Rejected value.
        value: String,
        /// What the key accepts.
        reason: String,
    },
}
