//! Ordered check plans
//!
//! Checks run strictly one after another. Repairs made by an earlier check
//! must be committed before a later check reads the same tables, so each
//! check declares its prerequisites ([`CheckKey::prerequisites`]) and a plan
//! is only accepted if every prerequisite precedes its dependant.

use crate::error::{DiagnosticsError, DiagnosticsResult};
use crate::key::CheckKey;

/// Validated execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckPlan {
    keys: Vec<CheckKey>,
}

impl CheckPlan {
    /// The full battery in canonical order
    #[must_use]
    pub fn standard() -> Self {
        Self {
            keys: CheckKey::ORDER.to_vec(),
        }
    }

    /// Build a plan from an explicit order
    ///
    /// # Errors
    /// Rejects duplicates and any check placed before a prerequisite.
    pub fn new(keys: Vec<CheckKey>) -> DiagnosticsResult<Self> {
        let plan = Self { keys };
        plan.validate()?;
        Ok(plan)
    }

    /// Verify ordering constraints
    ///
    /// # Errors
    /// `DiagnosticsError::InvalidPlan` naming the first offending check.
    pub fn validate(&self) -> DiagnosticsResult<()> {
        for (position, key) in self.keys.iter().enumerate() {
            let earlier = &self.keys[..position];
            if earlier.contains(key) {
                return Err(DiagnosticsError::InvalidPlan {
                    check: *key,
                    reason: "appears more than once".to_string(),
                });
            }
            if let Some(missing) = key.prerequisites().iter().find(|p| !earlier.contains(p)) {
                return Err(DiagnosticsError::InvalidPlan {
                    check: *key,
                    reason: format!("must run after `{missing}`"),
                });
            }
        }
        Ok(())
    }

    /// Checks in execution order
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = CheckKey> + '_ {
        self.keys.iter().copied()
    }

    /// Number of checks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the plan runs nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check if the plan includes `key`
    #[inline]
    #[must_use]
    pub fn contains(&self, key: CheckKey) -> bool {
        self.keys.contains(&key)
    }
}

impl Default for CheckPlan {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_plan_is_valid() {
        let plan = CheckPlan::standard();
        assert!(plan.validate().is_ok());
        assert_eq!(plan.len(), 8);
        assert_eq!(plan.keys().next(), Some(CheckKey::Database));
        assert_eq!(plan.keys().last(), Some(CheckKey::Ai));
    }

    #[test]
    fn inventory_before_schema_is_rejected() {
        let err = CheckPlan::new(vec![
            CheckKey::Database,
            CheckKey::Inventory,
            CheckKey::Schema,
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            DiagnosticsError::InvalidPlan {
                check: CheckKey::Inventory,
                ..
            }
        ));
    }

    #[test]
    fn duplicates_are_rejected() {
        assert!(CheckPlan::new(vec![CheckKey::Storage, CheckKey::Storage]).is_err());
    }

    #[test]
    fn independent_checks_run_alone() {
        assert!(CheckPlan::new(vec![CheckKey::Ai, CheckKey::Storage, CheckKey::Accounting]).is_ok());
        assert!(CheckPlan::new(vec![CheckKey::Sales]).is_err());
    }

    proptest! {
        #[test]
        fn accepted_plans_respect_prerequisites(
            order in Just(CheckKey::ORDER.to_vec()).prop_shuffle()
        ) {
            let accepted = CheckPlan::new(order.clone()).is_ok();
            let respects = order.iter().enumerate().all(|(i, key)| {
                key.prerequisites().iter().all(|p| order[..i].contains(p))
            });
            prop_assert_eq!(accepted, respects);
        }
    }
}
