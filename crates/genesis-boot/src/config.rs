//! Boot configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file is
//! a valid configuration.
//!
//! ```toml
//! headless = true
//! check_timeout_ms = 5000
//!
//! [diagnostics]
//! sales_sample_size = 250
//! ```

use crate::error::ConfigError;
use genesis_diagnostics::DiagnosticsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings key the boot report is stored under
pub const DEFAULT_REPORT_KEY: &str = "last_boot_report";

/// Boot sequence configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootConfig {
    /// Pause before checks start
    #[serde(default = "default_init_delay")]
    pub init_delay_ms: u64,

    /// Pause after each check
    #[serde(default = "default_check_delay")]
    pub check_delay_ms: u64,

    /// Pause before signalling readiness after a clean run
    #[serde(default = "default_auto_advance_delay")]
    pub auto_advance_delay_ms: u64,

    /// Non-interactive mode; all pacing delays are zero
    #[serde(default)]
    pub headless: bool,

    /// Bypass diagnostics entirely
    #[serde(default)]
    pub skip_diagnostics: bool,

    /// Upper bound on a single check (unbounded when absent)
    #[serde(default)]
    pub check_timeout_ms: Option<u64>,

    /// Device connectivity reported to the AI check
    #[serde(default = "default_true")]
    pub online: bool,

    /// Data directory measured for storage usage
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Settings key of the persisted boot report
    #[serde(default = "default_report_key")]
    pub report_key: String,

    /// Check thresholds
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            init_delay_ms: default_init_delay(),
            check_delay_ms: default_check_delay(),
            auto_advance_delay_ms: default_auto_advance_delay(),
            headless: false,
            skip_diagnostics: false,
            check_timeout_ms: None,
            online: true,
            data_dir: None,
            report_key: default_report_key(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

fn default_init_delay() -> u64 {
    500
}
fn default_check_delay() -> u64 {
    150
}
fn default_auto_advance_delay() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}
fn default_report_key() -> String {
    DEFAULT_REPORT_KEY.to_string()
}

impl BootConfig {
    /// Configuration for non-interactive runs
    #[must_use]
    pub fn headless() -> Self {
        Self::default().with_headless(true)
    }

    /// Read and validate a TOML file
    ///
    /// # Errors
    /// Fails if the file is unreadable, malformed or inconsistent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), headless = config.headless, "boot config loaded");
        Ok(config)
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Fails if the text is malformed or inconsistent.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value consistency
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_key.trim().is_empty() {
            return Err(ConfigError::Invalid("report_key must not be empty".to_string()));
        }
        if self.check_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "check_timeout_ms must be positive; omit it to disable".to_string(),
            ));
        }
        self.diagnostics
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// With headless mode
    #[inline]
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// With a per-check timeout
    #[inline]
    #[must_use]
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// With the diagnostics bypass
    #[inline]
    #[must_use]
    pub fn with_skip_diagnostics(mut self, skip: bool) -> Self {
        self.skip_diagnostics = skip;
        self
    }

    /// Pause before checks start
    #[must_use]
    pub fn init_delay(&self) -> Duration {
        self.paced(self.init_delay_ms)
    }

    /// Pause after each check
    #[must_use]
    pub fn check_delay(&self) -> Duration {
        self.paced(self.check_delay_ms)
    }

    /// Pause before auto-advancing
    #[must_use]
    pub fn auto_advance_delay(&self) -> Duration {
        self.paced(self.auto_advance_delay_ms)
    }

    /// Per-check time limit
    #[must_use]
    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_ms.map(Duration::from_millis)
    }

    fn paced(&self, millis: u64) -> Duration {
        if self.headless {
            Duration::ZERO
        } else {
            Duration::from_millis(millis)
        }
    }
}
