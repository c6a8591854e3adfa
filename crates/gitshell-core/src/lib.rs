//! Core types and utilities shared by the gitshell crates.
//!
//! - [`Config`] trait with file-backed and in-memory implementations
//! - [`ConfigError`] for configuration failures

pub mod config;
pub mod errors;
#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use errors::ConfigError;
