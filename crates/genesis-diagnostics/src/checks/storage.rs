use super::{Check, CheckContext};
use crate::error::DiagnosticsResult;
use crate::key::CheckKey;
use crate::result::{CheckDetails, CheckResult};

/// Storage quota headroom
///
/// The critical threshold is tested first so both thresholds can fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageCheck;

#[async_trait::async_trait]
impl Check for StorageCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Storage
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        let Some(estimate) = ctx.environment.storage_estimate().await? else {
            return Ok(CheckResult::success("Storage estimate API not available"));
        };
        let Some(used_percent) = estimate.used_percent() else {
            return Ok(CheckResult::success("Storage quota unknown"));
        };

        let used_mb = estimate.usage_mb();
        let quota_mb = estimate.quota_mb();
        let details = CheckDetails::Storage {
            used_mb,
            quota_mb,
            used_percent,
        };

        if used_percent > ctx.config.storage_critical_percent {
            tracing::error!(used_percent, "storage critically full");
            return Ok(
                CheckResult::critical(format!("Storage critical! {used_percent:.1}%"))
                    .with_details(details),
            );
        }
        if used_percent > ctx.config.storage_warning_percent {
            tracing::warn!(used_percent, "storage nearly full");
            return Ok(CheckResult::warning(format!(
                "Storage at {used_percent:.1}% ({used_mb:.2}MB / {quota_mb:.2}MB)"
            ))
            .with_details(details));
        }

        Ok(CheckResult::success(format!(
            "{used_mb:.2}MB used ({used_percent:.1}%)"
        )))
    }
}
