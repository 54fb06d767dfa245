//! Typed check outcomes

use crate::status::Status;
use serde::{Deserialize, Serialize};

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Severity
    pub status: Status,
    /// User-visible summary
    pub message: String,
    /// Number of records repaired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repaired: Option<usize>,
    /// Condition can be repaired by recreating the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_repair: Option<bool>,
    /// Check-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CheckDetails>,
}

impl CheckResult {
    /// Create a result with no payload
    #[must_use]
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            repaired: None,
            can_repair: None,
            details: None,
        }
    }

    /// Successful result
    #[inline]
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Status::Success, message)
    }

    /// Warning result
    #[inline]
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Status::Warning, message)
    }

    /// Error result
    #[inline]
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, message)
    }

    /// Critical result
    #[inline]
    #[must_use]
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Status::Critical, message)
    }

    /// With a repaired count
    #[inline]
    #[must_use]
    pub fn with_repaired(mut self, count: usize) -> Self {
        self.repaired = Some(count);
        self
    }

    /// With the repairable flag
    #[inline]
    #[must_use]
    pub fn with_can_repair(mut self, can_repair: bool) -> Self {
        self.can_repair = Some(can_repair);
        self
    }

    /// With structured details
    #[inline]
    #[must_use]
    pub fn with_details(mut self, details: CheckDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Per-check structured payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckDetails {
    /// Required tables absent from the store
    Database {
        /// Table names
        missing_tables: Vec<String>,
    },
    /// Accounting equation breakdown
    Accounting {
        /// Sum of asset balances
        assets: f64,
        /// Sum of liability balances
        liabilities: f64,
        /// Sum of equity balances
        equity: f64,
        /// `assets - (liabilities + equity)`
        diff: f64,
    },
    /// Sales whose totals disagree with their items
    Sales {
        /// Number of mismatching sales
        discrepancies: usize,
        /// Each mismatch
        mismatches: Vec<SaleMismatch>,
    },
    /// Storage usage
    Storage {
        /// Megabytes used
        used_mb: f64,
        /// Megabytes available in total
        quota_mb: f64,
        /// Percent used, one decimal
        used_percent: f64,
    },
    /// AI configuration state
    Ai {
        /// A configuration row exists
        configured: bool,
        /// Configured provider
        #[serde(default, skip_serializing_if = "Option::is_none")]
        provider: Option<String>,
        /// Requests go through the international proxy
        proxy_enabled: bool,
    },
}

/// Stored and recomputed totals of one sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleMismatch {
    /// Sale identity
    pub sale_id: String,
    /// Total stored on the sale
    pub stored: f64,
    /// Sum of `price * quantity` over its items
    pub computed: f64,
}
