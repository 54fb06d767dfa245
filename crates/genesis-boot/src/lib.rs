//! Genesis Boot - self-healing start-up sequence
//!
//! Runs the diagnostics battery before the point-of-sale application opens:
//! - Phases: `Init` → `Checking` → `Complete`, or `Error` when the run itself fails
//! - Two progress events per check, in plan order
//! - One persisted [`BootReport`] per run, overwriting the previous one
//! - A readiness gate: clean runs proceed, anything else waits for acknowledgement
//!
//! # Example
//!
//! ```rust,ignore
//! use genesis_boot::{BootConfig, BootOutcome, BootSequencer, NoProgress};
//! use genesis_diagnostics::StaticEnvironment;
//! use genesis_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), genesis_boot::BootError> {
//! let sequencer = BootSequencer::assemble(
//!     Arc::new(MemoryStore::genesis()),
//!     Arc::new(StaticEnvironment::new()),
//!     BootConfig::headless(),
//! )
//! .await?;
//!
//! match sequencer.run(&NoProgress).await? {
//!     BootOutcome::Ready(report) => println!("ready: {}", report.overall),
//!     BootOutcome::AwaitingAcknowledgement(pending) => {
//!         for repair in pending.repairs() {
//!             println!("repaired: {repair}");
//!         }
//!         let _report = pending.acknowledge();
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod error;
mod outcome;
mod progress;
mod report;
mod sequencer;
pub mod state_machine;

pub use config::{BootConfig, DEFAULT_REPORT_KEY};
pub use error::{BootError, ConfigError};
pub use outcome::{BootOutcome, BootStart, PendingBoot};
pub use progress::{ChannelProgress, NoProgress, ProgressEvent, ProgressObserver};
pub use report::{BootReport, BootReportStore};
pub use sequencer::BootSequencer;
pub use state_machine::BootPhase;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
