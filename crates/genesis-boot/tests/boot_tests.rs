//! End-to-end boot sequence behaviour

use async_trait::async_trait;
use genesis_boot::{
    BootConfig, BootError, BootOutcome, BootPhase, BootReportStore, BootSequencer, BootStart,
    ChannelProgress, NoProgress, ProgressEvent,
};
use genesis_diagnostics::{
    Check, CheckContext, CheckKey, CheckResult, Diagnostics, DiagnosticsResult, ProgressStatus,
    StaticEnvironment, Status,
};
use genesis_store::{tables, MemoryStore, Product, RecordStoreExt};
use genesis_test_utils::{healthy_store, raw_row, troubled_store, StoreBuilder};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

async fn sequencer(store: Arc<MemoryStore>, config: BootConfig) -> BootSequencer {
    BootSequencer::assemble(store, Arc::new(StaticEnvironment::new()), config)
        .await
        .unwrap()
}

fn with_check(store: Arc<MemoryStore>, check: impl Check + 'static, config: BootConfig) -> BootSequencer {
    let diagnostics = Diagnostics::new(store, Arc::new(StaticEnvironment::new()))
        .with_check(Arc::new(check));
    BootSequencer::new(Arc::new(diagnostics), config)
}

fn ready_store() -> Arc<MemoryStore> {
    let store = healthy_store();
    let snapshot = store.snapshot();
    let with_ai = StoreBuilder::new().ai_configured("gemini").build().snapshot();
    let mut merged = snapshot;
    merged.tables.extend(with_ai.tables.into_iter().filter(|(name, _)| name == tables::SETTINGS));
    Arc::new(MemoryStore::from_snapshot(store.schema(), merged).unwrap())
}

/// Waits until released
struct Gate(Arc<Notify>);

#[async_trait]
impl Check for Gate {
    fn key(&self) -> CheckKey {
        CheckKey::Storage
    }

    async fn run(&self, _ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        self.0.notified().await;
        Ok(CheckResult::success("released"))
    }
}

struct Exploding;

#[async_trait]
impl Check for Exploding {
    fn key(&self) -> CheckKey {
        CheckKey::Ai
    }

    async fn run(&self, _ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        panic!("assistant module exploded");
    }
}

struct Hanging;

#[async_trait]
impl Check for Hanging {
    fn key(&self) -> CheckKey {
        CheckKey::Storage
    }

    async fn run(&self, _ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        std::future::pending::<()>().await;
        Ok(CheckResult::success("unreachable"))
    }
}

#[tokio::test]
async fn empty_store_is_held_only_for_ai() {
    let seq = sequencer(Arc::new(MemoryStore::genesis()), BootConfig::headless()).await;
    let outcome = seq.run(&NoProgress).await.unwrap();

    let report = outcome.report();
    assert_eq!(report.overall, Status::Warning);
    assert_eq!(report.results.keys().copied().collect::<Vec<_>>(), CheckKey::ORDER.to_vec());
    assert_eq!(report.with_status(Status::Warning).collect::<Vec<_>>(), vec![CheckKey::Ai]);
    assert_eq!(report.result(CheckKey::Ai).unwrap().message, "AI not configured");
    assert_eq!(
        report.result(CheckKey::Accounting).unwrap().message,
        "No accounts (new system)"
    );
    assert!(report.repairs.is_empty());
    assert!(!outcome.is_ready());
    assert_eq!(seq.phase(), BootPhase::Complete);
}

#[tokio::test]
async fn clean_store_is_ready() {
    let seq = sequencer(ready_store(), BootConfig::headless()).await;
    let outcome = seq.run(&NoProgress).await.unwrap();

    assert!(outcome.is_ready(), "{:#?}", outcome.report().results);
    let BootOutcome::Ready(report) = outcome else {
        unreachable!();
    };
    assert_eq!(report.result(CheckKey::Ai).unwrap().message, "GEMINI configured");
    assert_eq!(report.result(CheckKey::Sales).unwrap().message, "1 sales verified");
}

#[tokio::test]
async fn troubled_store_repairs_in_commit_order_then_settles() {
    let store = Arc::new(troubled_store());
    let seq = sequencer(store.clone(), BootConfig::headless()).await;

    let first = seq.run(&NoProgress).await.unwrap();
    let report = first.report();
    assert_eq!(
        report.repairs,
        vec![
            "Corrupted product quarantined: p-bad".to_string(),
            "Negative stock corrected: Bread [p1] (-3 -> 0)".to_string(),
            "Orphaned item removed: ghost-1 (sale s-missing)".to_string(),
        ]
    );
    assert_eq!(report.result(CheckKey::Schema).unwrap().repaired, Some(1));
    assert_eq!(report.result(CheckKey::Inventory).unwrap().repaired, Some(1));
    assert_eq!(report.result(CheckKey::Orphans).unwrap().repaired, Some(1));
    assert_eq!(report.result(CheckKey::Accounting).unwrap().status, Status::Warning);
    assert_eq!(report.result(CheckKey::Sales).unwrap().status, Status::Warning);

    let BootOutcome::AwaitingAcknowledgement(pending) = first else {
        panic!("repairs must be reviewed");
    };
    assert_eq!(pending.repairs().len(), 3);
    let _ = pending.acknowledge();

    let p1 = store.table::<Product>().get("p1").await.unwrap().unwrap();
    assert_eq!(p1.stock, 0.0);
    let ghost = raw_row(&store, tables::SALE_ITEMS, "ghost-1").unwrap();
    assert!(ghost["deleted_at"].is_string());

    let second = seq.run(&NoProgress).await.unwrap();
    let report = second.report();
    assert!(report.repairs.is_empty());
    assert_eq!(report.result(CheckKey::Schema).unwrap().message, "Schema intact");
    assert_eq!(report.result(CheckKey::Orphans).unwrap().message, "No orphaned records");
    assert_eq!(
        report.with_status(Status::Warning).collect::<Vec<_>>(),
        vec![CheckKey::Accounting, CheckKey::Sales, CheckKey::Ai]
    );
}

#[tokio::test]
async fn progress_has_two_events_per_check() {
    let seq = sequencer(Arc::new(MemoryStore::genesis()), BootConfig::headless()).await;
    let (observer, mut rx) = ChannelProgress::channel();
    let _ = seq.run(&observer).await.unwrap();

    let mut events: Vec<ProgressEvent> = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 16);
    for (n, pair) in events.chunks(2).enumerate() {
        assert_eq!(pair[0].check, CheckKey::ORDER[n]);
        assert_eq!(pair[0].status, ProgressStatus::Checking);
        assert_eq!(pair[1].check, CheckKey::ORDER[n]);
        assert_ne!(pair[1].status, ProgressStatus::Checking);
        assert_eq!(pair[0].current, n + 1);
        assert_eq!(pair[1].total, 8);
    }
    assert_eq!(events[15].status, ProgressStatus::Done(Status::Warning));
    assert_eq!(events[15].percent(), 100);
}

#[tokio::test]
async fn concurrent_run_is_rejected() {
    let gate = Arc::new(Notify::new());
    let seq = with_check(
        Arc::new(MemoryStore::genesis()),
        Gate(gate.clone()),
        BootConfig::headless(),
    );

    let (first, second) = tokio::join!(seq.run(&NoProgress), async {
        tokio::task::yield_now().await;
        let second = seq.run(&NoProgress).await;
        gate.notify_one();
        second
    });

    assert!(matches!(second, Err(BootError::RunInProgress)));
    let first = first.unwrap();
    assert_eq!(first.report().result(CheckKey::Storage).unwrap().message, "released");

    gate.notify_one();
    assert!(seq.run(&NoProgress).await.is_ok());
}

#[tokio::test]
async fn panicking_check_becomes_error_and_run_continues() {
    let (observer, mut rx) = ChannelProgress::channel();
    let seq = with_check(ready_store(), Exploding, BootConfig::headless());
    let outcome = seq.run(&observer).await.unwrap();

    let ai = outcome.report().result(CheckKey::Ai).unwrap();
    assert_eq!(ai.status, Status::Error);
    assert_eq!(ai.message, "assistant module exploded");
    assert_eq!(outcome.report().overall, Status::Error);
    assert_eq!(seq.phase(), BootPhase::Complete);

    let mut count = 0;
    while rx.try_recv().is_ok() {
        count += 1;
    }
    assert_eq!(count, 16);
}

#[tokio::test(start_paused = true)]
async fn hanging_check_times_out() {
    let config = BootConfig::headless().with_check_timeout(Duration::from_millis(50));
    let seq = with_check(ready_store(), Hanging, config);
    let outcome = seq.run(&NoProgress).await.unwrap();

    let storage = outcome.report().result(CheckKey::Storage).unwrap();
    assert_eq!(storage.status, Status::Error);
    assert_eq!(storage.message, "check timed out after 50ms");
    assert_eq!(outcome.report().result(CheckKey::Ai).unwrap().status, Status::Success);
}

#[tokio::test]
async fn report_is_persisted_and_overwritten() {
    let store = Arc::new(troubled_store());
    let seq = sequencer(store.clone(), BootConfig::headless()).await;

    let first = seq.run(&NoProgress).await.unwrap();
    let saved = BootReportStore::default().load(store.as_ref()).await.unwrap().unwrap();
    assert_eq!(saved.repairs, first.report().repairs);
    assert_eq!(saved.overall, first.report().overall);

    let second = seq.run(&NoProgress).await.unwrap();
    let saved = BootReportStore::default().load(store.as_ref()).await.unwrap().unwrap();
    assert!(saved.repairs.is_empty());
    assert_eq!(saved.timestamp, second.report().timestamp);

    let raw = raw_row(&store, tables::SETTINGS, "last_boot_report").unwrap();
    assert!(raw["value"].as_str().unwrap().contains("\"overall\""));
}

#[tokio::test]
async fn report_write_failure_ends_in_error_phase() {
    let store = Arc::new(healthy_store());
    let seq = sequencer(store.clone(), BootConfig::headless()).await;
    let mut phases = seq.subscribe();

    store.fail_writes(tables::SETTINGS);
    let result = seq.run(&NoProgress).await;

    let Err(error) = result else {
        panic!("expected the report write to fail");
    };
    assert!(matches!(error, BootError::Unsaved { ref source, .. } if matches!(**source, BootError::Report(_))));
    assert_eq!(error.unsaved_report().map(|r| r.results.len()), Some(8));
    assert_eq!(seq.phase(), BootPhase::Error);
    assert!(phases.has_changed().unwrap());
    assert_eq!(*phases.borrow_and_update(), BootPhase::Error);

    store.clear_faults();
    assert!(seq.run(&NoProgress).await.is_ok());
    assert_eq!(seq.phase(), BootPhase::Complete);
}

#[tokio::test]
async fn unavailable_store_still_runs_every_check() {
    let store = Arc::new(healthy_store());
    store.set_unavailable("blocked by browser");
    let seq = sequencer(store.clone(), BootConfig::headless()).await;
    let (observer, mut events) = ChannelProgress::channel();

    let error = seq.run(&observer).await.unwrap_err();

    let report = error.unsaved_report().unwrap();
    assert_eq!(report.overall, Status::Critical);
    assert_eq!(report.results.len(), 8);
    let database = report.result(CheckKey::Database).unwrap();
    assert_eq!(database.status, Status::Critical);
    assert!(database.message.contains("blocked by browser"));
    assert_eq!(seq.phase(), BootPhase::Error);

    let mut count = 0;
    while events.try_recv().is_ok() {
        count += 1;
    }
    assert_eq!(count, 16);
}

#[tokio::test]
async fn missing_storage_engine_is_critical() {
    let diagnostics = Diagnostics::new(
        Arc::new(healthy_store()),
        Arc::new(StaticEnvironment::new().with_engine_available(false)),
    );
    let seq = BootSequencer::new(Arc::new(diagnostics), BootConfig::headless());
    let outcome = seq.run(&NoProgress).await.unwrap();

    let database = outcome.report().result(CheckKey::Database).unwrap();
    assert_eq!(database.status, Status::Critical);
    assert_eq!(outcome.report().overall, Status::Critical);
    assert_eq!(outcome.report().results.len(), 8);
}

#[tokio::test]
async fn skip_diagnostics_bypasses_the_run() {
    let store = Arc::new(troubled_store());
    let seq = sequencer(store.clone(), BootConfig::headless().with_skip_diagnostics(true)).await;

    let started = seq.start(&NoProgress).await.unwrap();
    assert_eq!(started, BootStart::Skipped);
    assert_eq!(seq.phase(), BootPhase::Init);
    assert!(BootReportStore::default().load(store.as_ref()).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_config_is_rejected_at_assembly() {
    let mut config = BootConfig::headless();
    config.check_timeout_ms = Some(0);
    let result =
        BootSequencer::assemble(Arc::new(MemoryStore::genesis()), Arc::new(StaticEnvironment::new()), config)
            .await;
    assert!(matches!(result, Err(BootError::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn interactive_pacing_adds_up() {
    let seq = sequencer(ready_store(), BootConfig::default()).await;
    let started = tokio::time::Instant::now();

    let outcome = seq.run(&NoProgress).await.unwrap();

    assert!(outcome.is_ready());
    assert!(started.elapsed() >= Duration::from_millis(500 + 8 * 150 + 1000));
}

#[tokio::test(start_paused = true)]
async fn held_outcome_skips_auto_advance() {
    let seq = sequencer(Arc::new(MemoryStore::genesis()), BootConfig::default()).await;
    let started = tokio::time::Instant::now();

    let outcome = seq.run(&NoProgress).await.unwrap();

    assert!(!outcome.is_ready());
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(500 + 8 * 150));
    assert!(elapsed < Duration::from_millis(500 + 8 * 150 + 1000));
}
