use super::{absent_as_empty, Check, CheckContext};
use crate::error::DiagnosticsResult;
use crate::key::CheckKey;
use crate::result::CheckResult;
use chrono::Utc;
use genesis_store::{Product, ProductPatch, RecordStoreExt, Rejected};
use serde_json::Value;

/// Product rows must carry an identity and a price
///
/// Corrupted rows are quarantined (delisted, soft-deleted, marked), never
/// removed. Rows already quarantined are left alone. A row too malformed to
/// read as a product counts as corrupted and is quarantined by its raw key.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaCheck;

#[async_trait::async_trait]
impl Check for SchemaCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Schema
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        let products = ctx.store.table::<Product>();
        let decoded = absent_as_empty(products.to_vec_lossy().await)?;

        let mut corrupted: Vec<String> = decoded
            .records
            .into_iter()
            .filter(|p| p.is_corrupted() && !p.corruption_detected)
            .map(|p| p.id)
            .collect();
        for row in decoded.rejected {
            if already_quarantined(&row) {
                continue;
            }
            match row.key {
                Some(key) => corrupted.push(key),
                None => tracing::warn!(reason = %row.reason, "unreadable product has no key"),
            }
        }

        if corrupted.is_empty() {
            return Ok(CheckResult::success("Schema intact"));
        }

        let mut repaired = 0;
        for id in &corrupted {
            if products
                .update(id, &ProductPatch::quarantine(Utc::now()))
                .await?
            {
                repaired += 1;
                ctx.repairs
                    .record(self.key(), format!("Corrupted product quarantined: {id}"));
            } else {
                tracing::debug!(id = %id, "corrupted product vanished before repair");
            }
        }

        if repaired == 0 {
            return Ok(CheckResult::success("Schema intact"));
        }
        Ok(CheckResult::warning(format!("{repaired} corrupted records repaired"))
            .with_repaired(repaired))
    }
}

fn already_quarantined(row: &Rejected) -> bool {
    match row.row.get("corruption_detected") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}
