//! The diagnostic checks
//!
//! Each check reads one or more tables, classifies the data against an
//! invariant and, for known-safe conditions, repairs it. A repair always
//! yields `Warning` so the repair log gets reviewed.
//!
//! A check returns `Err` for failures it cannot classify; the engine turns
//! those into a result through [`Check::on_failure`].

mod accounting;
mod ai;
mod database;
mod inventory;
mod orphans;
mod sales;
mod schema;
mod storage;

pub use accounting::AccountingCheck;
pub use ai::AiCheck;
pub use database::DatabaseCheck;
pub use inventory::InventoryCheck;
pub use orphans::OrphansCheck;
pub use sales::SalesCheck;
pub use schema::SchemaCheck;
pub use storage::StorageCheck;

use crate::config::DiagnosticsConfig;
use crate::environment::Environment;
use crate::error::{DiagnosticsError, DiagnosticsResult};
use crate::key::CheckKey;
use crate::preferences::Preferences;
use crate::repair::RepairLog;
use crate::result::CheckResult;
use genesis_store::{RecordStore, StoreResult};
use std::sync::Arc;

/// Everything a check may touch during one run
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    /// Record store under inspection
    pub store: &'a dyn RecordStore,
    /// Host facts
    pub environment: &'a dyn Environment,
    /// Thresholds and keys
    pub config: &'a DiagnosticsConfig,
    /// User preferences
    pub preferences: &'a Preferences,
    /// Where committed repairs are recorded
    pub repairs: &'a RepairLog,
}

impl std::fmt::Debug for CheckContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckContext")
            .field("config", self.config)
            .field("preferences", self.preferences)
            .field("repairs", &self.repairs.len())
            .finish_non_exhaustive()
    }
}

/// One diagnostic routine
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    /// Identity of the check
    fn key(&self) -> CheckKey;

    /// Inspect, and where policy allows, repair
    ///
    /// # Errors
    /// Any failure the check cannot classify itself.
    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult>;

    /// Result reported when [`Check::run`] fails
    fn on_failure(&self, error: &DiagnosticsError) -> CheckResult {
        CheckResult::error(error.to_string())
    }
}

/// The eight built-in checks in canonical order
#[must_use]
pub fn builtin() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(DatabaseCheck),
        Arc::new(SchemaCheck),
        Arc::new(AccountingCheck),
        Arc::new(InventoryCheck),
        Arc::new(OrphansCheck),
        Arc::new(SalesCheck),
        Arc::new(StorageCheck),
        Arc::new(AiCheck),
    ]
}

/// Read an absent table as empty
fn absent_as_empty<T: Default>(rows: StoreResult<T>) -> StoreResult<T> {
    match rows {
        Err(e) if e.is_missing_table() => Ok(T::default()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_checks_follow_canonical_order() {
        let keys: Vec<_> = builtin().iter().map(|c| c.key()).collect();
        assert_eq!(keys, CheckKey::ORDER.to_vec());
    }
}
