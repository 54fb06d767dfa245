//! Diagnostics engine
//!
//! Owns the checks and the collaborators they need. The boot sequencer calls
//! [`Diagnostics::execute`] for each planned check with the run's shared
//! repair log; [`Diagnostics::run_check`] re-runs a single check on demand.

use crate::checks::{self, Check, CheckContext};
use crate::config::DiagnosticsConfig;
use crate::environment::Environment;
use crate::error::DiagnosticsResult;
use crate::key::CheckKey;
use crate::plan::CheckPlan;
use crate::preferences::Preferences;
use crate::repair::{Repair, RepairLog};
use crate::result::CheckResult;
use genesis_store::RecordStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Result of a stand-alone check run
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRun {
    /// Check outcome
    pub result: CheckResult,
    /// Repairs committed by this run
    pub repairs: Vec<Repair>,
}

/// The battery of checks bound to a store and a host
pub struct Diagnostics {
    store: Arc<dyn RecordStore>,
    environment: Arc<dyn Environment>,
    config: DiagnosticsConfig,
    preferences: Preferences,
    plan: CheckPlan,
    checks: BTreeMap<CheckKey, Arc<dyn Check>>,
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("config", &self.config)
            .field("preferences", &self.preferences)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl Diagnostics {
    /// Create an engine with the built-in checks and default settings
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, environment: Arc<dyn Environment>) -> Self {
        Self {
            store,
            environment,
            config: DiagnosticsConfig::default(),
            preferences: Preferences::default(),
            plan: CheckPlan::standard(),
            checks: checks::builtin().into_iter().map(|c| (c.key(), c)).collect(),
        }
    }

    /// With configuration
    ///
    /// # Errors
    /// Rejects inconsistent thresholds.
    pub fn with_config(mut self, config: DiagnosticsConfig) -> DiagnosticsResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// With preferences
    #[inline]
    #[must_use]
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// With a plan
    ///
    /// # Errors
    /// Rejects plans that break prerequisite order.
    pub fn with_plan(mut self, plan: CheckPlan) -> DiagnosticsResult<Self> {
        plan.validate()?;
        self.plan = plan;
        Ok(self)
    }

    /// Replace the implementation of one check
    #[must_use]
    pub fn with_check(mut self, check: Arc<dyn Check>) -> Self {
        self.checks.insert(check.key(), check);
        self
    }

    /// Execution order
    #[inline]
    #[must_use]
    pub fn plan(&self) -> &CheckPlan {
        &self.plan
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Preferences passed to the checks
    #[inline]
    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Record store under inspection
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Run one check, turning its failure into a result
    pub async fn execute(&self, key: CheckKey, repairs: &RepairLog) -> CheckResult {
        let Some(check) = self.checks.get(&key) else {
            tracing::error!(check = %key, "no implementation registered");
            return CheckResult::error(format!("no implementation for check `{key}`"));
        };

        let ctx = CheckContext {
            store: self.store.as_ref(),
            environment: self.environment.as_ref(),
            config: &self.config,
            preferences: &self.preferences,
            repairs,
        };

        let started = Instant::now();
        let result = match check.run(&ctx).await {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(check = %key, error = %error, "check failed");
                check.on_failure(&error)
            }
        };
        tracing::info!(
            check = %key,
            status = %result.status,
            repaired = result.repaired.unwrap_or_default(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "{}",
            result.message
        );
        result
    }

    /// Run one check on its own with a fresh repair log
    pub async fn run_check(&self, key: CheckKey) -> CheckRun {
        let repairs = RepairLog::new();
        let result = self.execute(key, &repairs).await;
        CheckRun {
            result,
            repairs: repairs.drain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::StaticEnvironment;
    use crate::error::DiagnosticsError;
    use crate::status::Status;
    use genesis_store::MemoryStore;

    struct Failing;

    #[async_trait::async_trait]
    impl Check for Failing {
        fn key(&self) -> CheckKey {
            CheckKey::Accounting
        }

        async fn run(&self, _ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
            Err(DiagnosticsError::Environment("ledger locked".to_string()))
        }
    }

    fn engine() -> Diagnostics {
        Diagnostics::new(
            Arc::new(MemoryStore::genesis()),
            Arc::new(StaticEnvironment::new()),
        )
    }

    #[tokio::test]
    async fn failure_becomes_error_result() {
        let diagnostics = engine().with_check(Arc::new(Failing));
        let run = diagnostics.run_check(CheckKey::Accounting).await;
        assert_eq!(run.result.status, Status::Error);
        assert!(run.result.message.contains("ledger locked"));
        assert!(run.repairs.is_empty());
    }

    #[tokio::test]
    async fn invalid_plan_is_refused() {
        let plan = CheckPlan::new(vec![CheckKey::Database]).unwrap();
        assert!(engine().with_plan(plan).is_ok());
        assert!(engine()
            .with_config(DiagnosticsConfig::default().with_storage_thresholds(99.0, 1.0))
            .is_err());
    }
}
