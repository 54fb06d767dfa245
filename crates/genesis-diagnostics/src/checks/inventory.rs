use super::{absent_as_empty, Check, CheckContext};
use crate::error::DiagnosticsResult;
use crate::key::CheckKey;
use crate::result::CheckResult;
use chrono::Utc;
use genesis_store::{Product, ProductPatch, Query, RecordStoreExt};

/// No active product below zero stock; negatives are clamped to zero
///
/// Rows that do not read as products are skipped here and left to the schema
/// check.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryCheck;

#[async_trait::async_trait]
impl Check for InventoryCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Inventory
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        let products = ctx.store.table::<Product>();
        let active = absent_as_empty(
            products
                .query_lossy(&Query::where_field("active").equals(1))
                .await,
        )?;
        if !active.rejected.is_empty() {
            tracing::warn!(
                skipped = active.rejected.len(),
                "unreadable products left out of the stock scan"
            );
        }
        let active = active.records;
        let negative: Vec<&Product> = active.iter().filter(|p| p.stock < 0.0).collect();

        if negative.is_empty() {
            return Ok(CheckResult::success(format!("{} products OK", active.len())));
        }

        let mut repaired = 0;
        for product in negative {
            if products
                .update(&product.id, &ProductPatch::clamp_stock(Utc::now()))
                .await?
            {
                repaired += 1;
                ctx.repairs.record(
                    self.key(),
                    format!(
                        "Negative stock corrected: {} [{}] ({} -> 0)",
                        product.name, product.id, product.stock
                    ),
                );
            } else {
                tracing::debug!(id = %product.id, "product vanished before stock correction");
            }
        }

        if repaired == 0 {
            return Ok(CheckResult::success(format!("{} products OK", active.len())));
        }
        Ok(
            CheckResult::warning(format!("{repaired} products with negative stock corrected"))
                .with_repaired(repaired),
        )
    }
}
