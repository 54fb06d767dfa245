//! Boot report and its persistence
//!
//! One report per run, stored as JSON text in the settings table. Each run
//! overwrites the previous report.

use crate::config::DEFAULT_REPORT_KEY;
use crate::error::BootError;
use chrono::{DateTime, Utc};
use genesis_diagnostics::{CheckKey, CheckResult, Status};
use genesis_store::{RecordStore, RecordStoreExt, Setting};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Aggregate outcome of one diagnostics run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootReport {
    /// Worst status across all checks
    pub overall: Status,
    /// Per-check results in execution order
    pub results: IndexMap<CheckKey, CheckResult>,
    /// Committed repairs in commit order
    pub repairs: Vec<String>,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

impl BootReport {
    /// Build a report, deriving `overall` from the results
    #[must_use]
    pub fn new(
        results: IndexMap<CheckKey, CheckResult>,
        repairs: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let overall = Status::worst(results.values().map(|r| r.status));
        Self {
            overall,
            results,
            repairs,
            timestamp,
        }
    }

    /// Result of one check
    #[must_use]
    pub fn result(&self, key: CheckKey) -> Option<&CheckResult> {
        self.results.get(&key)
    }

    /// Checks that finished with `status`
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = CheckKey> + '_ {
        self.results
            .iter()
            .filter(move |(_, r)| r.status == status)
            .map(|(k, _)| *k)
    }

    /// Check if the run found nothing to review
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.overall.is_success()
    }
}

/// Reads and writes the persisted boot report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReportStore {
    key: String,
}

impl Default for BootReportStore {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_KEY)
    }
}

impl BootReportStore {
    /// Store under a settings key
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Settings key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrite the persisted report
    ///
    /// # Errors
    /// Fails if the report cannot be encoded or the store rejects the write.
    pub async fn save<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        report: &BootReport,
    ) -> Result<(), BootError> {
        let setting = Setting::json(self.key.as_str(), report)?;
        store.table::<Setting>().put(&setting).await?;
        tracing::info!(key = %self.key, overall = %report.overall, "boot report saved");
        Ok(())
    }

    /// Last persisted report, if any
    ///
    /// # Errors
    /// Fails if the store cannot be read or the stored value is not a report.
    pub async fn load<S: RecordStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<BootReport>, BootError> {
        let Some(setting) = store.table::<Setting>().get(&self.key).await? else {
            return Ok(None);
        };
        if setting.is_blank() {
            return Ok(None);
        }
        Ok(Some(setting.decode()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_store::{tables, MemoryStore, RecordStore};
    use pretty_assertions::assert_eq;

    fn sample() -> BootReport {
        let mut results = IndexMap::new();
        results.insert(CheckKey::Database, CheckResult::success("Connection OK"));
        results.insert(CheckKey::Ai, CheckResult::warning("AI not configured"));
        BootReport::new(results, vec!["fixed".to_string()], Utc::now())
    }

    #[test]
    fn overall_is_worst_of_results() {
        let report = sample();
        assert_eq!(report.overall, Status::Warning);
        assert_eq!(report.with_status(Status::Warning).collect::<Vec<_>>(), vec![CheckKey::Ai]);
    }

    #[test]
    fn wire_shape() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["overall"], "warning");
        assert_eq!(v["results"]["database"]["status"], "success");
        assert_eq!(v["repairs"][0], "fixed");
        assert!(v["timestamp"].is_string());
        let keys: Vec<_> = v["results"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn save_overwrites_and_loads() {
        let store = MemoryStore::genesis();
        let reports = BootReportStore::default();
        assert!(reports.load(&store).await.unwrap().is_none());

        let first = sample();
        reports.save(&store, &first).await.unwrap();
        let second = BootReport::new(IndexMap::new(), Vec::new(), Utc::now());
        reports.save(&store, &second).await.unwrap();

        assert_eq!(store.count(tables::SETTINGS).await.unwrap(), 1);
        let loaded = reports.load(&store).await.unwrap().unwrap();
        assert_eq!(loaded.overall, Status::Success);
        assert!(loaded.results.is_empty());

        let raw = store.get(tables::SETTINGS, "last_boot_report").await.unwrap().unwrap();
        assert!(raw["value"].is_string());
    }
}
