use super::{absent_as_empty, Check, CheckContext};
use crate::error::DiagnosticsResult;
use crate::key::CheckKey;
use crate::result::CheckResult;
use chrono::Utc;
use genesis_store::{key_string, tables, Query, RecordStoreExt, SaleItem, SaleItemPatch};
use std::collections::HashSet;

/// Every live line item must reference an existing sale
///
/// Orphans are soft-deleted and marked. Soft-deleted items are outside the
/// scan, so a repaired orphan is not reported again. Sales are read as raw
/// ids only, so a sale with odd fields still counts as existing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphansCheck;

#[async_trait::async_trait]
impl Check for OrphansCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Orphans
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        let items_table = ctx.store.table::<SaleItem>();
        let items = absent_as_empty(items_table.to_vec_lossy().await)?;
        if !items.rejected.is_empty() {
            tracing::warn!(
                skipped = items.rejected.len(),
                "unreadable sale items left out of the orphan scan"
            );
        }
        let sale_ids: HashSet<String> =
            absent_as_empty(ctx.store.scan(tables::SALES, &Query::All).await)?
                .iter()
                .filter_map(|row| row.get("id").and_then(key_string))
                .collect();

        let orphans: Vec<&SaleItem> = items
            .records
            .iter()
            .filter(|i| !i.is_deleted() && !sale_ids.contains(&i.sale_id))
            .collect();

        if orphans.is_empty() {
            return Ok(CheckResult::success("No orphaned records"));
        }

        let mut repaired = 0;
        for item in orphans {
            if items_table
                .update(&item.id, &SaleItemPatch::orphaned(Utc::now()))
                .await?
            {
                repaired += 1;
                ctx.repairs.record(
                    self.key(),
                    format!("Orphaned item removed: {} (sale {})", item.id, item.sale_id),
                );
            } else {
                tracing::debug!(id = %item.id, "orphaned item vanished before repair");
            }
        }

        if repaired == 0 {
            return Ok(CheckResult::success("No orphaned records"));
        }
        Ok(CheckResult::warning(format!("{repaired} orphaned records cleaned"))
            .with_repaired(repaired))
    }
}
