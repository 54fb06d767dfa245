//! Typed entity records
//!
//! Each record keeps fields it does not model in `extra`, so a typed
//! read-modify-write never drops data written by other parts of the
//! application.

mod account;
mod codec;
mod customer;
mod product;
mod sale;
mod setting;

pub use account::{Account, AccountClass};
pub use customer::Customer;
pub use product::{Product, ProductPatch};
pub use sale::{Sale, SaleItem, SaleItemPatch};
pub use setting::Setting;
