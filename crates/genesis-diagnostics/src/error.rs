//! Diagnostics error types

use crate::key::CheckKey;
use genesis_store::StoreError;

/// Result alias for diagnostics operations
pub type DiagnosticsResult<T> = Result<T, DiagnosticsError>;

/// Failure inside a check or while assembling the engine
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsError {
    /// Record store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stored configuration could not be decoded
    #[error("invalid stored value: {0}")]
    Decode(#[from] serde_json::Error),

    /// Host query failed
    #[error("environment query failed: {0}")]
    Environment(String),

    /// A check runs before one of its prerequisites
    #[error("invalid check plan: `{check}` {reason}")]
    InvalidPlan {
        /// Offending check
        check: CheckKey,
        /// What is wrong with its position
        reason: String,
    },

    /// Configuration values are inconsistent
    #[error("invalid diagnostics configuration: {0}")]
    InvalidConfig(String),

    /// Name does not identify a check
    #[error("unknown check: {0}")]
    UnknownCheck(String),
}

impl DiagnosticsError {
    /// Check if the storage engine itself is unreachable
    #[must_use]
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_unavailable())
    }
}
