//! Table schema declarations
//!
//! Tables are declared with the compact index syntax used by the browser
//! store the application was built on: the first entry is the primary key
//! (`++` prefix for auto-increment), the rest are secondary indexes.

use serde::{Deserialize, Serialize};

/// Well-known table names
pub mod tables {
    /// Product catalogue
    pub const PRODUCTS: &str = "products";
    /// Product categories
    pub const CATEGORIES: &str = "categories";
    /// Sale headers
    pub const SALES: &str = "sales";
    /// Sale line items
    pub const SALE_ITEMS: &str = "saleItems";
    /// Customers
    pub const CUSTOMERS: &str = "customers";
    /// Ledger accounts
    pub const ACCOUNTS: &str = "accounts";
    /// Key-value settings
    pub const SETTINGS: &str = "settings";
    /// Audit trail
    pub const AUDIT_LOG: &str = "auditLog";
}

/// Primary key declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryKey {
    /// Caller-supplied key stored in the named field
    Field(String),
    /// Store-assigned increasing integer key
    AutoIncrement(String),
}

impl PrimaryKey {
    /// Field holding the key
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Field(f) | Self::AutoIncrement(f) => f,
        }
    }

    /// Check if the store assigns keys
    #[inline]
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        matches!(self, Self::AutoIncrement(_))
    }
}

/// Declaration of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Primary key
    pub primary_key: PrimaryKey,
    /// Secondary indexes
    pub indexes: Vec<String>,
}

impl TableSchema {
    /// Parse an index declaration such as `"++id, name, phone"`
    ///
    /// Unique (`&`) and multi-entry (`*`) markers are accepted and dropped;
    /// an empty declaration falls back to an `id` primary key.
    #[must_use]
    pub fn parse(name: impl Into<String>, declaration: &str) -> Self {
        let mut parts = declaration
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let primary_key = match parts.next() {
            Some(first) => match first.strip_prefix("++") {
                Some(field) => PrimaryKey::AutoIncrement(field.to_string()),
                None => PrimaryKey::Field(strip_markers(first).to_string()),
            },
            None => PrimaryKey::Field("id".to_string()),
        };

        let indexes = parts.map(|p| strip_markers(p).to_string()).collect();

        Self {
            name: name.into(),
            primary_key,
            indexes,
        }
    }

    /// Check if a field can be used in a `where` clause
    #[inline]
    #[must_use]
    pub fn is_indexed(&self, field: &str) -> bool {
        self.primary_key.field() == field || self.indexes.iter().any(|i| i == field)
    }
}

fn strip_markers(entry: &str) -> &str {
    entry.trim_start_matches(['&', '*'])
}

/// Versioned set of table declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema version
    pub version: u32,
    /// Tables in declaration order
    pub tables: Vec<TableSchema>,
}

impl Schema {
    /// Create an empty schema
    #[inline]
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            version,
            tables: Vec::new(),
        }
    }

    /// Add a table from its index declaration
    #[must_use]
    pub fn table(mut self, name: &str, declaration: &str) -> Self {
        self.tables.retain(|t| t.name != name);
        self.tables.push(TableSchema::parse(name, declaration));
        self
    }

    /// Drop a table declaration
    #[must_use]
    pub fn without(mut self, name: &str) -> Self {
        self.tables.retain(|t| t.name != name);
        self
    }

    /// Look up a table
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in declaration order
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    /// Application schema
    #[must_use]
    pub fn genesis() -> Self {
        Self::new(6)
            .table(tables::PRODUCTS, "id, name, barcode, category_id, active, deleted_at, synced")
            .table(tables::CATEGORIES, "id, name, active, deleted_at")
            .table(
                tables::SALES,
                "id, local_id, created_at, customer_id, payment_status, status, synced, voided_at",
            )
            .table(tables::SALE_ITEMS, "id, sale_id, product_id, deleted_at")
            .table(tables::CUSTOMERS, "++id, name, phone, email, active, deleted_at")
            .table(tables::ACCOUNTS, "id, code, name, type, parent, active")
            .table(tables::SETTINGS, "key")
            .table(
                tables::AUDIT_LOG,
                "++id, entity_type, entity_id, action, user_id, details, timestamp",
            )
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::genesis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_auto_increment_declaration() {
        let t = TableSchema::parse("customers", "++id, name, &email, *tags");
        assert_eq!(t.primary_key, PrimaryKey::AutoIncrement("id".to_string()));
        assert_eq!(t.indexes, vec!["name", "email", "tags"]);
        assert!(t.is_indexed("id"));
        assert!(t.is_indexed("email"));
        assert!(!t.is_indexed("balance"));
    }

    #[test]
    fn parse_keyed_declaration() {
        let t = TableSchema::parse("settings", "key");
        assert_eq!(t.primary_key, PrimaryKey::Field("key".to_string()));
        assert!(t.indexes.is_empty());
    }

    #[test]
    fn genesis_schema_has_required_tables() {
        let schema = Schema::genesis();
        for name in [tables::PRODUCTS, tables::SALES, tables::CUSTOMERS, tables::SETTINGS] {
            assert!(schema.get(name).is_some(), "missing {name}");
        }
        assert!(schema.get(tables::SALE_ITEMS).unwrap().is_indexed("sale_id"));
    }

    #[test]
    fn without_drops_table() {
        let schema = Schema::genesis().without(tables::CUSTOMERS);
        assert!(schema.get(tables::CUSTOMERS).is_none());
        assert!(schema.get(tables::PRODUCTS).is_some());
    }
}
