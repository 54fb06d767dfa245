//! Testing utilities for the Genesis workspace
//!
//! Seeded stores and record builders shared by the crate test suites.

#![allow(missing_docs)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use genesis_store::{
    tables, Account, MemoryStore, Product, Record, Sale, SaleItem, Schema, Setting, Snapshot,
};
use serde_json::{json, Value};

/// Fixed reference time so ordering in tests is deterministic
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

/// `base_time() + minutes`
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

/// Synchronous builder for a pre-populated [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    schema: Schema,
    snapshot: Snapshot,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema::genesis(),
            snapshot: Snapshot::default(),
        }
    }

    /// Drop a table from the schema
    pub fn without_table(mut self, table: &str) -> Self {
        self.schema = self.schema.without(table);
        self
    }

    /// Add a raw JSON row
    pub fn row(mut self, table: &str, row: Value) -> Self {
        self.snapshot.tables.entry(table.to_string()).or_default().push(row);
        self
    }

    /// Add a typed record
    pub fn record<R: Record>(self, record: &R) -> Self {
        let row = serde_json::to_value(record).unwrap();
        self.row(R::TABLE, row)
    }

    pub fn product(self, product: Product) -> Self {
        self.record(&product)
    }

    pub fn account(self, code: &str, balance: f64) -> Self {
        self.record(&Account::new(code, format!("Account {code}"), balance))
    }

    pub fn sale(self, sale: Sale) -> Self {
        self.record(&sale)
    }

    pub fn item(self, item: SaleItem) -> Self {
        self.record(&item)
    }

    pub fn setting(self, setting: Setting) -> Self {
        self.record(&setting)
    }

    /// AI configuration with a provider and a credential
    pub fn ai_configured(self, provider: &str) -> Self {
        self.setting(
            Setting::json("ai_config", &json!({"provider": provider, "apiKey": "sk-test"})).unwrap(),
        )
    }

    pub fn build(self) -> MemoryStore {
        MemoryStore::from_snapshot(self.schema, self.snapshot).unwrap()
    }
}

/// Sale `id` with one item per `(price, quantity)` whose stored total matches
pub fn balanced_sale(id: &str, minute: i64, lines: &[(f64, f64)]) -> (Sale, Vec<SaleItem>) {
    let total: f64 = lines.iter().map(|(p, q)| p * q).sum();
    let items = lines
        .iter()
        .enumerate()
        .map(|(n, (price, quantity))| SaleItem::new(format!("{id}-i{n}"), id, *price, *quantity))
        .collect();
    (Sale::new(id, total, at_minute(minute)), items)
}

/// Store holding a clean, balanced dataset: every check but `ai` succeeds
pub fn healthy_store() -> MemoryStore {
    let (sale, items) = balanced_sale("s1", 0, &[(2.5, 2.0), (1.0, 3.0)]);
    let mut builder = StoreBuilder::new()
        .product(Product::new("p1", "Bread", 2.5).with_stock(10))
        .product(Product::new("p2", "Milk", 1.0).with_stock(4))
        .account("1100", 500.0)
        .account("2100", 200.0)
        .account("3100", 300.0)
        .sale(sale);
    for item in items {
        builder = builder.item(item);
    }
    builder.build()
}

/// Store with one problem of every kind the checks look for
///
/// - `p-bad` has no price
/// - `p1` is active with stock -3
/// - `ghost-1` references a sale that does not exist
/// - `s2` stores 50 but its items add up to 40
/// - assets exceed liabilities plus equity by 100
pub fn troubled_store() -> MemoryStore {
    StoreBuilder::new()
        .product(Product::new("p1", "Bread", 2.5).with_stock(-3))
        .product(Product::new("p-bad", "Unknown", 0.0).without_price())
        .product(Product::new("p2", "Milk", 1.0).with_stock(7))
        .account("1100", 100.0)
        .sale(Sale::new("s1", 10.0, at_minute(1)))
        .item(SaleItem::new("s1-i0", "s1", 5.0, 2.0))
        .sale(Sale::new("s2", 50.0, at_minute(2)))
        .item(SaleItem::new("s2-i0", "s2", 20.0, 2.0))
        .item(SaleItem::new("ghost-1", "s-missing", 3.0, 1.0))
        .build()
}

/// Count rows of a table straight from a snapshot
pub fn row_count(store: &MemoryStore, table: &str) -> usize {
    store.snapshot().tables.get(table).map_or(0, Vec::len)
}

/// Raw row by key straight from a snapshot
pub fn raw_row(store: &MemoryStore, table: &str, key: &str) -> Option<Value> {
    let pk = if table == tables::SETTINGS { "key" } else { "id" };
    store
        .snapshot()
        .tables
        .get(table)?
        .iter()
        .find(|row| row.get(pk).and_then(Value::as_str) == Some(key))
        .cloned()
}
