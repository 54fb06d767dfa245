//! Boot phases and their legal transitions
//!
//! ```text
//! Init -> Checking -> Complete
//!            |
//!            +-----> Error
//! ```
//!
//! `Complete` and `Error` are terminal for a run. A new run starts over at
//! `Init`; nothing is re-entered within one run.

use crate::error::BootError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the boot sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootPhase {
    /// Waiting to start checks
    #[default]
    Init,
    /// Running checks
    Checking,
    /// Report persisted; readiness decided
    Complete,
    /// Orchestration failed; needs a manual retry
    Error,
}

impl BootPhase {
    /// Check if no transition leaves this phase
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }
}

impl fmt::Display for BootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Checking => "checking",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Validate a transition within one run
///
/// # Errors
/// `BootError::IllegalTransition` if `to` is not reachable from `from`.
pub fn validate_transition(from: BootPhase, to: BootPhase) -> Result<(), BootError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(BootError::IllegalTransition { from, to })
    }
}

/// Phases reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: BootPhase) -> &'static [BootPhase] {
    use BootPhase::{Checking, Complete, Error, Init};
    match from {
        Init => &[Checking],
        Checking => &[Complete, Error],
        Complete | Error => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn phase() -> impl Strategy<Value = BootPhase> {
        prop_oneof![
            Just(BootPhase::Init),
            Just(BootPhase::Checking),
            Just(BootPhase::Complete),
            Just(BootPhase::Error),
        ]
    }

    #[test]
    fn happy_path() {
        assert!(validate_transition(BootPhase::Init, BootPhase::Checking).is_ok());
        assert!(validate_transition(BootPhase::Checking, BootPhase::Complete).is_ok());
        assert!(validate_transition(BootPhase::Checking, BootPhase::Error).is_ok());
    }

    #[test]
    fn terminal_phases() {
        assert!(BootPhase::Complete.is_terminal());
        assert!(BootPhase::Error.is_terminal());
        assert!(!BootPhase::Init.is_terminal());
        assert!(validate_transition(BootPhase::Complete, BootPhase::Init).is_err());
    }

    #[test]
    fn init_cannot_skip_checking() {
        assert!(validate_transition(BootPhase::Init, BootPhase::Complete).is_err());
        assert!(validate_transition(BootPhase::Init, BootPhase::Error).is_err());
    }

    proptest! {
        #[test]
        fn no_self_transitions(p in phase()) {
            prop_assert!(validate_transition(p, p).is_err());
        }

        #[test]
        fn validation_agrees_with_table(from in phase(), to in phase()) {
            prop_assert_eq!(
                validate_transition(from, to).is_ok(),
                allowed_transitions(from).contains(&to)
            );
        }

        #[test]
        fn every_walk_ends_in_a_terminal_phase(choices in prop::collection::vec(any::<prop::sample::Index>(), 0..8)) {
            let mut current = BootPhase::Init;
            let mut steps = 0;
            for choice in &choices {
                let next = allowed_transitions(current);
                if next.is_empty() {
                    break;
                }
                current = next[choice.index(next.len())];
                steps += 1;
            }
            prop_assert!(steps <= 2);
            if choices.len() >= 2 {
                prop_assert!(current.is_terminal());
            }
        }
    }
}
