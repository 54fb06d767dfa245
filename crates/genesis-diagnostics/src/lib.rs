//! Genesis Diagnostics - data-integrity checks with bounded self-repair
//!
//! Runs a fixed battery of checks against the local record store:
//! - Storage engine reachable and core tables present
//! - Product rows intact; corrupted rows quarantined
//! - Accounting equation balanced (report only)
//! - No negative stock on active products; clamped to zero
//! - No line items without a sale; orphans soft-deleted
//! - Sale totals match their items (report only)
//! - Storage quota headroom
//! - AI assistant configuration
//!
//! Financial records are never rewritten. Every committed repair lands in a
//! [`RepairLog`] in commit order.
//!
//! # Example
//!
//! ```rust,ignore
//! use genesis_diagnostics::{CheckKey, Diagnostics, StaticEnvironment};
//! use genesis_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let diagnostics = Diagnostics::new(
//!     Arc::new(MemoryStore::genesis()),
//!     Arc::new(StaticEnvironment::new()),
//! );
//!
//! let run = diagnostics.run_check(CheckKey::Inventory).await;
//! println!("{}: {}", run.result.status, run.result.message);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod checks;
mod config;
mod engine;
mod environment;
mod error;
mod key;
mod plan;
mod preferences;
mod repair;
mod result;
mod status;

pub use checks::{Check, CheckContext};
pub use config::DiagnosticsConfig;
pub use engine::{CheckRun, Diagnostics};
pub use environment::{Environment, HostEnvironment, StaticEnvironment, StorageEstimate};
pub use error::{DiagnosticsError, DiagnosticsResult};
pub use key::CheckKey;
pub use plan::CheckPlan;
pub use preferences::{Preferences, PROXY_ENABLED_KEY};
pub use repair::{Repair, RepairLog};
pub use result::{CheckDetails, CheckResult, SaleMismatch};
pub use status::{ProgressStatus, Status};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
