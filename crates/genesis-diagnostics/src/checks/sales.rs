use super::{absent_as_empty, Check, CheckContext};
use crate::error::DiagnosticsResult;
use crate::key::CheckKey;
use crate::result::{CheckDetails, CheckResult, SaleMismatch};
use genesis_store::{Query, RecordStoreExt, Sale, SaleItem};
use std::cmp::Reverse;

/// Stored sale totals must match their line items
///
/// Only the most recent non-voided sales are re-totalled. Mismatches are
/// reported, never rewritten. Unreadable rows are skipped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalesCheck;

#[async_trait::async_trait]
impl Check for SalesCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Sales
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        let decoded = absent_as_empty(ctx.store.table::<Sale>().to_vec_lossy().await)?;
        if !decoded.rejected.is_empty() {
            tracing::warn!(
                skipped = decoded.rejected.len(),
                "unreadable sales left out of re-totalling"
            );
        }
        let mut sales: Vec<Sale> = decoded
            .records
            .into_iter()
            .filter(|s| !s.is_voided())
            .collect();
        // undated sales sort last
        sales.sort_by_key(|s| Reverse(s.created_at));
        sales.truncate(ctx.config.sales_sample_size);

        let items = ctx.store.table::<SaleItem>();
        let mut mismatches = Vec::new();
        for sale in &sales {
            let computed: f64 = absent_as_empty(
                items
                    .query_lossy(&Query::where_field("sale_id").equals(sale.id.as_str()))
                    .await,
            )?
            .records
            .iter()
            .map(SaleItem::line_total)
            .sum();

            let stored = sale.total_or_zero();
            if (stored - computed).abs() > ctx.config.tolerance {
                tracing::warn!(sale = %sale.id, stored, computed, "sale total discrepancy");
                mismatches.push(SaleMismatch {
                    sale_id: sale.id.clone(),
                    stored,
                    computed,
                });
            }
        }

        if mismatches.is_empty() {
            return Ok(CheckResult::success(format!("{} sales verified", sales.len())));
        }

        let discrepancies = mismatches.len();
        Ok(
            CheckResult::warning(format!("{discrepancies} sales with discrepancies")).with_details(
                CheckDetails::Sales {
                    discrepancies,
                    mismatches,
                },
            ),
        )
    }
}
