//! Genesis Store - embedded record store
//!
//! The client-local table storage the whole application persists to.
//! Diagnostics treat it as an opaque collaborator and reach it only through
//! the [`RecordStore`] trait:
//! - Schema-declared tables with a primary key and secondary indexes
//! - Indexed `where` queries (`equals`, `between`) plus client-side filters
//! - Partial updates, adds, upserts and bulk adds
//!
//! [`MemoryStore`] is the in-process implementation, with JSON
//! [`Snapshot`] import/export and fault injection for tests and tooling.
//!
//! # Example
//!
//! ```rust,ignore
//! use genesis_store::{MemoryStore, Product, Query, RecordStoreExt};
//!
//! # async fn example() -> Result<(), genesis_store::StoreError> {
//! let store = MemoryStore::genesis();
//! store.table::<Product>().add(&Product::new("p1", "Bread", 2.5)).await?;
//!
//! let active = store
//!     .table::<Product>()
//!     .query(&Query::where_field("active").equals(1))
//!     .await?;
//! assert_eq!(active.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod memory;
mod query;
pub mod records;
mod schema;
mod snapshot;
mod store;
mod table;

pub use error::{StoreError, StoreResult};
pub use memory::{Faults, MemoryStore};
pub use query::{Query, WhereClause};
pub use records::{
    Account, AccountClass, Customer, Product, ProductPatch, Sale, SaleItem, SaleItemPatch,
    Setting,
};
pub use schema::{tables, PrimaryKey, Schema, TableSchema};
pub use snapshot::Snapshot;
pub use store::{key_string, RecordStore};
pub use table::{Decoded, Record, RecordStoreExt, Rejected, Table};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
