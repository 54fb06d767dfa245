//! Boot error types

use crate::report::BootReport;
use crate::state_machine::BootPhase;
use genesis_diagnostics::DiagnosticsError;
use genesis_store::StoreError;
use std::path::PathBuf;

/// Boot sequencer failure
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    /// Another diagnostics run is active
    #[error("a diagnostics run is already in progress")]
    RunInProgress,

    /// Phase change not allowed by the state machine
    #[error("illegal boot phase transition: {from} -> {to}")]
    IllegalTransition {
        /// Current phase
        from: BootPhase,
        /// Requested phase
        to: BootPhase,
    },

    /// Boot report could not be written or read
    #[error("boot report storage failed: {0}")]
    Report(#[from] StoreError),

    /// Every check ran but the report could not be persisted
    #[error("boot report not saved: {source}")]
    Unsaved {
        /// Report of the finished run
        report: Box<BootReport>,
        /// Why persisting failed
        #[source]
        source: Box<BootError>,
    },

    /// Boot report could not be encoded or decoded
    #[error("boot report encoding failed: {0}")]
    ReportEncoding(#[from] serde_json::Error),

    /// Diagnostics engine could not be assembled
    #[error(transparent)]
    Diagnostics(#[from] DiagnosticsError),

    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BootError {
    /// Check if the failure leaves the sequencer in the `Error` phase
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Report(_)
                | Self::ReportEncoding(_)
                | Self::Unsaved { .. }
                | Self::IllegalTransition { .. }
        )
    }

    /// Report of a run that finished but could not be persisted
    #[must_use]
    pub fn unsaved_report(&self) -> Option<&BootReport> {
        match self {
            Self::Unsaved { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for the config shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are inconsistent
    #[error("invalid config value: {0}")]
    Invalid(String),
}
