//! Check statuses and severity ordering

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome severity, ordered from best to worst
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Invariant holds
    #[default]
    Success,
    /// Inconsistency reported or repaired; needs review
    Warning,
    /// Check could not complete
    Error,
    /// System cannot operate
    Critical,
}

impl Status {
    /// Worst status in `statuses`, or `Success` when there are none
    #[must_use]
    pub fn worst<I: IntoIterator<Item = Self>>(statuses: I) -> Self {
        statuses.into_iter().max().unwrap_or_default()
    }

    /// Check if this is `Success`
    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Status carried by a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// Check started
    Checking,
    /// Check finished with this status
    #[serde(untagged)]
    Done(Status),
}

impl ProgressStatus {
    /// Final status, if the check has finished
    #[inline]
    #[must_use]
    pub fn status(self) -> Option<Status> {
        match self {
            Self::Checking => None,
            Self::Done(status) => Some(status),
        }
    }
}

impl From<Status> for ProgressStatus {
    fn from(status: Status) -> Self {
        Self::Done(status)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => f.write_str("checking"),
            Self::Done(status) => status.fmt(f),
        }
    }
}
