use super::{absent_as_empty, Check, CheckContext};
use crate::error::DiagnosticsResult;
use crate::key::CheckKey;
use crate::result::{CheckDetails, CheckResult};
use genesis_store::{Account, AccountClass, RecordStoreExt};

/// Assets = Liabilities + Equity
///
/// Accounts outside the three code ranges do not take part in the sums.
/// Balances are never corrected; this check only reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountingCheck;

#[async_trait::async_trait]
impl Check for AccountingCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Accounting
    }

    async fn run(&self, ctx: &CheckContext<'_>) -> DiagnosticsResult<CheckResult> {
        let accounts = absent_as_empty(ctx.store.table::<Account>().to_vec().await)?;
        if accounts.is_empty() {
            return Ok(CheckResult::success("No accounts (new system)"));
        }

        let (mut assets, mut liabilities, mut equity) = (0.0, 0.0, 0.0);
        for account in &accounts {
            match account.class() {
                AccountClass::Asset => assets += account.balance_or_zero(),
                AccountClass::Liability => liabilities += account.balance_or_zero(),
                AccountClass::Equity => equity += account.balance_or_zero(),
                AccountClass::Other => {}
            }
        }

        let diff = assets - (liabilities + equity);
        if diff.abs() > ctx.config.tolerance {
            tracing::warn!(assets, liabilities, equity, diff, "accounting equation unbalanced");
            return Ok(CheckResult::warning(format!("Imbalance: ${diff:.2}")).with_details(
                CheckDetails::Accounting {
                    assets,
                    liabilities,
                    equity,
                    diff,
                },
            ));
        }

        Ok(CheckResult::success("Equation balanced"))
    }
}
