//! Repair log
//!
//! Entries are appended only after the store has accepted the write, so the
//! log lists exactly the committed mutations in commit order.

use crate::key::CheckKey;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One committed repair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repair {
    /// Check that performed it
    pub check: CheckKey,
    /// Human-readable description
    pub description: String,
    /// Commit time
    pub at: DateTime<Utc>,
}

/// Append-only log shared by the checks of one run
#[derive(Debug, Default)]
pub struct RepairLog {
    entries: Mutex<Vec<Repair>>,
}

impl RepairLog {
    /// Create an empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed repair
    pub fn record(&self, check: CheckKey, description: impl Into<String>) {
        let repair = Repair {
            check,
            description: description.into(),
            at: Utc::now(),
        };
        tracing::info!(check = %check, repair = %repair.description, "repair committed");
        self.entries.lock().push(repair);
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing was repaired
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the entries
    #[must_use]
    pub fn entries(&self) -> Vec<Repair> {
        self.entries.lock().clone()
    }

    /// Entries recorded by one check
    #[must_use]
    pub fn for_check(&self, check: CheckKey) -> Vec<Repair> {
        self.entries
            .lock()
            .iter()
            .filter(|r| r.check == check)
            .cloned()
            .collect()
    }

    /// Descriptions in commit order
    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|r| r.description.clone())
            .collect()
    }

    /// Take the entries, leaving the log empty
    #[must_use]
    pub fn drain(&self) -> Vec<Repair> {
        std::mem::take(&mut *self.entries.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_commit_order() {
        let log = RepairLog::new();
        log.record(CheckKey::Schema, "first");
        log.record(CheckKey::Inventory, "second");
        log.record(CheckKey::Schema, "third");

        assert_eq!(log.descriptions(), vec!["first", "second", "third"]);
        assert_eq!(log.for_check(CheckKey::Schema).len(), 2);
        assert_eq!(log.drain().len(), 3);
        assert!(log.is_empty());
    }
}
