//! Progress reporting
//!
//! Two events per check: `Checking` when it starts, then its final status.

use genesis_diagnostics::{CheckKey, ProgressStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Live progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Check concerned
    pub check: CheckKey,
    /// Started, or finished with a status
    pub status: ProgressStatus,
    /// 1-based position in the plan
    pub current: usize,
    /// Checks in the plan
    pub total: usize,
}

impl ProgressEvent {
    /// Completion percentage, rounded
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.current.min(self.total) * 100 + self.total / 2) / self.total;
        u8::try_from(pct).unwrap_or(100)
    }
}

/// Receiver of progress events
pub trait ProgressObserver: Send + Sync {
    /// Called synchronously from the run loop
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event);
    }
}

/// Observer forwarding events into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create an observer and the receiving end of its channel
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl From<mpsc::UnboundedSender<ProgressEvent>> for ChannelProgress {
    fn from(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressObserver for ChannelProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        if self.tx.send(*event).is_err() {
            tracing::trace!(check = %event.check, "progress receiver dropped");
        }
    }
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
