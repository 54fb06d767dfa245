//! Readiness gate
//!
//! A clean run is ready on its own. Anything else is held until someone
//! acknowledges it, and acknowledging hands back the report so the repair
//! log can be shown first.

use crate::report::BootReport;

/// Result of a completed run
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a held boot outcome must be acknowledged before the application proceeds"]
pub enum BootOutcome {
    /// Every check succeeded
    Ready(BootReport),
    /// Warnings, errors or critical findings need review
    AwaitingAcknowledgement(PendingBoot),
}

impl BootOutcome {
    /// Gate a report on its overall status
    pub fn from_report(report: BootReport) -> Self {
        if report.is_success() {
            Self::Ready(report)
        } else {
            Self::AwaitingAcknowledgement(PendingBoot { report })
        }
    }

    /// The report, whatever the gate decided
    #[must_use]
    pub fn report(&self) -> &BootReport {
        match self {
            Self::Ready(report) | Self::AwaitingAcknowledgement(PendingBoot { report }) => report,
        }
    }

    /// Check if the application may proceed without review
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Report held for review
#[derive(Debug, Clone, PartialEq)]
#[must_use = "call `acknowledge` to proceed past a non-success boot"]
pub struct PendingBoot {
    report: BootReport,
}

impl PendingBoot {
    /// Report under review
    #[must_use]
    pub fn report(&self) -> &BootReport {
        &self.report
    }

    /// Repairs the reviewer should see
    #[must_use]
    pub fn repairs(&self) -> &[String] {
        &self.report.repairs
    }

    /// Accept the findings and proceed
    pub fn acknowledge(self) -> BootReport {
        tracing::info!(
            overall = %self.report.overall,
            repairs = self.report.repairs.len(),
            "boot outcome acknowledged"
        );
        self.report
    }
}

/// What starting the boot sequence did
#[derive(Debug, Clone, PartialEq)]
pub enum BootStart {
    /// Diagnostics were bypassed by configuration
    Skipped,
    /// Diagnostics ran to completion
    Completed(BootOutcome),
}
