use super::{Check, CheckContext};
use crate::error::{DiagnosticsError, DiagnosticsResult};
use crate::key::CheckKey;
use crate::result::{CheckDetails, CheckResult};

/// Storage engine reachable and required tables present
///
/// Only reports: missing tables are flagged as repairable but never created
/// here. Any failure to reach the engine is `Critical`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseCheck;

#[async_trait::async_trait]
impl Check for DatabaseCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Database
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        if !ctx.environment.storage_engine_available() {
            return Ok(CheckResult::critical("Storage engine not available"));
        }

        ctx.store.open().await?;
        let present = ctx.store.table_names().await?;
        let missing: Vec<String> = ctx
            .config
            .required_tables
            .iter()
            .filter(|t| !present.contains(t))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(CheckResult::success("Connection OK"));
        }

        tracing::warn!(missing = ?missing, "required tables missing");
        Ok(CheckResult::warning(format!("Missing tables: {}", missing.join(", ")))
            .with_can_repair(true)
            .with_details(CheckDetails::Database {
                missing_tables: missing,
            }))
    }

    fn on_failure(&self, error: &DiagnosticsError) -> CheckResult {
        CheckResult::critical(error.to_string())
    }
}
