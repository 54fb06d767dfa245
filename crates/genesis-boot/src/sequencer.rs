//! Boot sequencer
//!
//! Drives one diagnostics run:
//! - `Init`, then a short pause (zero when headless)
//! - `Checking`: every planned check, one at a time, each isolated so a
//!   failing or panicking check becomes an `Error` result and the loop goes on
//! - aggregate, persist the report, then `Complete`
//! - `Error` only when orchestration itself fails (the report cannot be saved)
//!
//! At most one run is active per sequencer; a second concurrent request is
//! rejected. Other write paths of the application should stay disabled until
//! the run completes or its outcome is acknowledged, since repairs take no
//! table locks.

use crate::config::BootConfig;
use crate::error::BootError;
use crate::outcome::{BootOutcome, BootStart};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::report::{BootReport, BootReportStore};
use crate::state_machine::{validate_transition, BootPhase};
use chrono::Utc;
use futures::FutureExt;
use genesis_diagnostics::{
    CheckKey, CheckResult, Diagnostics, Environment, Preferences, ProgressStatus, RepairLog,
};
use genesis_store::RecordStore;
use indexmap::IndexMap;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// Runs diagnostics and gates application start-up on the outcome
pub struct BootSequencer {
    diagnostics: Arc<Diagnostics>,
    config: BootConfig,
    reports: BootReportStore,
    phase: watch::Sender<BootPhase>,
    running: Mutex<()>,
}

impl std::fmt::Debug for BootSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootSequencer")
            .field("config", &self.config)
            .field("phase", &*self.phase.borrow())
            .finish_non_exhaustive()
    }
}

impl BootSequencer {
    /// Create a sequencer around an assembled engine
    #[must_use]
    pub fn new(diagnostics: Arc<Diagnostics>, config: BootConfig) -> Self {
        let reports = BootReportStore::new(config.report_key.clone());
        let (phase, _) = watch::channel(BootPhase::Init);
        Self {
            diagnostics,
            config,
            reports,
            phase,
            running: Mutex::new(()),
        }
    }

    /// Assemble the engine from a store and host, loading preferences once
    ///
    /// An unreachable store does not stop assembly: preferences fall back to
    /// their defaults and the database check reports the failure.
    ///
    /// # Errors
    /// Fails if the configuration is inconsistent.
    pub async fn assemble(
        store: Arc<dyn RecordStore>,
        environment: Arc<dyn Environment>,
        config: BootConfig,
    ) -> Result<Self, BootError> {
        config.validate()?;
        let preferences = Preferences::load(store.as_ref()).await;
        let diagnostics = Diagnostics::new(store, environment)
            .with_config(config.diagnostics.clone())?
            .with_preferences(preferences);
        Ok(Self::new(Arc::new(diagnostics), config))
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> BootPhase {
        *self.phase.borrow()
    }

    /// Subscribe to phase changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BootPhase> {
        self.phase.subscribe()
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    /// Engine in use
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Report persistence
    #[inline]
    #[must_use]
    pub fn reports(&self) -> &BootReportStore {
        &self.reports
    }

    /// Start the boot sequence, honouring `skip_diagnostics`
    ///
    /// # Errors
    /// See [`BootSequencer::run`].
    pub async fn start(&self, observer: &dyn ProgressObserver) -> Result<BootStart, BootError> {
        if self.config.skip_diagnostics {
            tracing::info!("diagnostics skipped by configuration");
            return Ok(BootStart::Skipped);
        }
        self.run(observer).await.map(BootStart::Completed)
    }

    /// Run every planned check and decide readiness
    ///
    /// # Errors
    /// - `BootError::RunInProgress` if another run is active
    /// - `BootError::Unsaved` if the report cannot be persisted; it still
    ///   carries the report, and the phase is then `Error`
    pub async fn run(&self, observer: &dyn ProgressObserver) -> Result<BootOutcome, BootError> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("diagnostics run rejected: another run is active");
            return Err(BootError::RunInProgress);
        };

        self.phase.send_replace(BootPhase::Init);
        tracing::info!(checks = self.diagnostics.plan().len(), "boot sequence starting");
        pause(self.config.init_delay()).await;
        self.transition(BootPhase::Checking)?;

        let repairs = RepairLog::new();
        let results = self.run_checks(observer, &repairs).await;
        let report = BootReport::new(results, repairs.descriptions(), Utc::now());

        if let Err(error) = self.reports.save(self.diagnostics.store().as_ref(), &report).await {
            tracing::error!(error = %error, "failed to persist boot report");
            self.transition(BootPhase::Error)?;
            return Err(BootError::Unsaved {
                report: Box::new(report),
                source: Box::new(error),
            });
        }
        self.transition(BootPhase::Complete)?;

        tracing::info!(
            overall = %report.overall,
            repairs = report.repairs.len(),
            "boot sequence complete"
        );

        let outcome = BootOutcome::from_report(report);
        if outcome.is_ready() {
            pause(self.config.auto_advance_delay()).await;
        } else {
            tracing::warn!(overall = %outcome.report().overall, "readiness held until acknowledged");
        }
        Ok(outcome)
    }

    async fn run_checks(
        &self,
        observer: &dyn ProgressObserver,
        repairs: &RepairLog,
    ) -> IndexMap<CheckKey, CheckResult> {
        let plan = self.diagnostics.plan();
        let total = plan.len();
        let mut results = IndexMap::with_capacity(total);

        for (index, key) in plan.keys().enumerate() {
            let current = index + 1;
            observer.on_progress(&ProgressEvent {
                check: key,
                status: ProgressStatus::Checking,
                current,
                total,
            });

            let result = self.run_isolated(key, repairs).await;

            observer.on_progress(&ProgressEvent {
                check: key,
                status: result.status.into(),
                current,
                total,
            });
            results.insert(key, result);
            pause(self.config.check_delay()).await;
        }
        results
    }

    /// One check; panics and timeouts become `Error` results
    async fn run_isolated(&self, key: CheckKey, repairs: &RepairLog) -> CheckResult {
        let guarded = AssertUnwindSafe(self.diagnostics.execute(key, repairs)).catch_unwind();
        let outcome = match self.config.check_timeout() {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::error!(check = %key, limit_ms = limit.as_millis(), "check timed out");
                    return CheckResult::error(format!("check timed out after {}ms", limit.as_millis()));
                }
            },
            None => guarded.await,
        };

        outcome.unwrap_or_else(|panic| {
            let message = panic_message(panic.as_ref());
            tracing::error!(check = %key, panic = %message, "check panicked");
            CheckResult::error(message)
        })
    }

    fn transition(&self, to: BootPhase) -> Result<(), BootError> {
        let from = self.phase();
        validate_transition(from, to)?;
        self.phase.send_replace(to);
        tracing::debug!(%from, %to, "boot phase changed");
        Ok(())
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}
