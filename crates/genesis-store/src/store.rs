//! Record store interface
//!
//! The only surface diagnostics depend on. Rows travel as JSON documents;
//! [`crate::Table`] layers typed access on top.

use crate::error::StoreResult;
use crate::query::Query;
use serde_json::{Map, Value};

/// Transactional key-indexed local database
///
/// Individual operations are serialized by the implementation; callers need
/// no extra locking for single reads or writes.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Establish the storage connection
    ///
    /// # Errors
    /// `StoreError::Unavailable` if the engine cannot be opened.
    async fn open(&self) -> StoreResult<()>;

    /// Names of the tables present in the opened database
    async fn table_names(&self) -> StoreResult<Vec<String>>;

    /// Rows matching a query, in primary key order
    ///
    /// # Errors
    /// - `StoreError::MissingTable` if the table does not exist
    /// - `StoreError::NotIndexed` if the query field is not indexed
    async fn scan(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Row by primary key
    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Value>>;

    /// Number of rows in a table
    async fn count(&self, table: &str) -> StoreResult<usize>;

    /// Shallow-merge `patch` into the row with `key`
    ///
    /// Returns `false` when no row has that key.
    async fn update(&self, table: &str, key: &str, patch: Map<String, Value>) -> StoreResult<bool>;

    /// Insert a new row and return its key
    ///
    /// # Errors
    /// `StoreError::DuplicateKey` if the key already exists.
    async fn add(&self, table: &str, record: Value) -> StoreResult<String>;

    /// Insert several rows; nothing is written if any row is rejected
    async fn bulk_add(&self, table: &str, records: Vec<Value>) -> StoreResult<Vec<String>>;

    /// Insert or replace a row and return its key
    async fn put(&self, table: &str, record: Value) -> StoreResult<String>;

    /// Remove a row; returns `false` when nothing was removed
    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool>;
}

/// Render a primary key value the way the store indexes it
#[must_use]
pub fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_string_renders_scalars() {
        assert_eq!(key_string(&json!("p1")).as_deref(), Some("p1"));
        assert_eq!(key_string(&json!(42)).as_deref(), Some("42"));
        assert_eq!(key_string(&json!("")).as_deref(), Some(""));
        assert!(key_string(&Value::Null).is_none());
        assert!(key_string(&json!({"a": 1})).is_none());
    }
}
