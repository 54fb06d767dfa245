//! Check identities

use crate::error::DiagnosticsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight diagnostic checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKey {
    /// Storage engine reachable and core tables present
    Database,
    /// Product rows carry identity and price
    Schema,
    /// Assets = Liabilities + Equity
    Accounting,
    /// No active product below zero stock
    Inventory,
    /// Every line item belongs to a sale
    Orphans,
    /// Sale totals match their line items
    Sales,
    /// Storage quota headroom
    Storage,
    /// AI assistant configured and reachable
    Ai,
}

impl CheckKey {
    /// Canonical execution order
    pub const ORDER: [Self; 8] = [
        Self::Database,
        Self::Schema,
        Self::Accounting,
        Self::Inventory,
        Self::Orphans,
        Self::Sales,
        Self::Storage,
        Self::Ai,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Schema => "schema",
            Self::Accounting => "accounting",
            Self::Inventory => "inventory",
            Self::Orphans => "orphans",
            Self::Sales => "sales",
            Self::Storage => "storage",
            Self::Ai => "ai",
        }
    }

    /// Human-readable name for progress displays
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Database => "Database (local store)",
            Self::Schema => "Schema integrity",
            Self::Accounting => "Accounting equation (A = L + E)",
            Self::Inventory => "Inventory consistency",
            Self::Orphans => "Orphaned records",
            Self::Sales => "Sales integrity",
            Self::Storage => "Storage capacity",
            Self::Ai => "AI engine",
        }
    }

    /// Checks whose repairs must be committed before this one runs
    #[must_use]
    pub const fn prerequisites(self) -> &'static [Self] {
        match self {
            Self::Schema | Self::Orphans => &[Self::Database],
            Self::Inventory => &[Self::Schema],
            Self::Sales => &[Self::Orphans],
            Self::Database | Self::Accounting | Self::Storage | Self::Ai => &[],
        }
    }

    /// Position in [`CheckKey::ORDER`]
    #[must_use]
    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|k| *k == self).unwrap_or_default()
    }
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKey {
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDER
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DiagnosticsError::UnknownCheck(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for key in CheckKey::ORDER {
            assert_eq!(key.as_str().parse::<CheckKey>().unwrap(), key);
            assert_eq!(
                serde_json::to_value(key).unwrap(),
                serde_json::Value::String(key.as_str().to_string())
            );
        }
        assert!("network".parse::<CheckKey>().is_err());
    }

    #[test]
    fn prerequisites_come_earlier_in_canonical_order() {
        for key in CheckKey::ORDER {
            for pre in key.prerequisites() {
                assert!(pre.index() < key.index(), "{pre} must precede {key}");
            }
        }
    }
}
