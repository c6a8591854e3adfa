//! Errors that only steer the exit code.

/// The operation ran but its answer was "no" (exit 2).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct NegativeResult(pub String);
