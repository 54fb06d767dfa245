//! Thresholds and keys used by the checks

use crate::error::{DiagnosticsError, DiagnosticsResult};
use genesis_store::tables;
use serde::{Deserialize, Serialize};

/// Diagnostics tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Largest difference treated as equal for money amounts
    pub tolerance: f64,
    /// Most recent sales re-totalled by the sales check
    pub sales_sample_size: usize,
    /// Tables the database check requires
    pub required_tables: Vec<String>,
    /// Usage percent above which storage is a warning
    pub storage_warning_percent: f64,
    /// Usage percent above which storage is critical
    pub storage_critical_percent: f64,
    /// Settings key holding the AI configuration
    pub ai_config_key: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            sales_sample_size: 100,
            required_tables: [tables::PRODUCTS, tables::SALES, tables::CUSTOMERS, tables::SETTINGS]
                .into_iter()
                .map(String::from)
                .collect(),
            storage_warning_percent: 90.0,
            storage_critical_percent: 95.0,
            ai_config_key: "ai_config".to_string(),
        }
    }
}

impl DiagnosticsConfig {
    /// Check value consistency
    ///
    /// # Errors
    /// `DiagnosticsError::InvalidConfig` describing the first problem.
    pub fn validate(&self) -> DiagnosticsResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(DiagnosticsError::InvalidConfig(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if self.storage_warning_percent > self.storage_critical_percent {
            return Err(DiagnosticsError::InvalidConfig(format!(
                "storage warning threshold {} exceeds critical threshold {}",
                self.storage_warning_percent, self.storage_critical_percent
            )));
        }
        if self.ai_config_key.trim().is_empty() {
            return Err(DiagnosticsError::InvalidConfig(
                "ai_config_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// With a sales sample size
    #[inline]
    #[must_use]
    pub fn with_sales_sample_size(mut self, size: usize) -> Self {
        self.sales_sample_size = size;
        self
    }

    /// With storage thresholds
    #[inline]
    #[must_use]
    pub fn with_storage_thresholds(mut self, warning: f64, critical: f64) -> Self {
        self.storage_warning_percent = warning;
        self.storage_critical_percent = critical;
        self
    }
}
