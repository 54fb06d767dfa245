//! In-memory record store
//!
//! Every operation takes the table lock once, so each read or write is
//! atomic with respect to the others.

use crate::error::{StoreError, StoreResult};
use crate::query::Query;
use crate::schema::{Schema, TableSchema};
use crate::snapshot::Snapshot;
use crate::store::{key_string, RecordStore};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Failure injection for tests and tooling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Faults {
    /// Engine refuses to open; every operation fails with `Unavailable`
    pub engine_unavailable: Option<String>,
    /// Tables whose reads fail
    pub failing_reads: BTreeSet<String>,
    /// Tables whose writes fail
    pub failing_writes: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct TableData {
    rows: BTreeMap<String, Value>,
    next_auto: u64,
}

#[derive(Debug)]
struct Inner {
    schema: Schema,
    tables: BTreeMap<String, TableData>,
    opened: bool,
}

/// Schema-aware in-memory store
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    faults: RwLock<Faults>,
}

impl MemoryStore {
    /// Create an empty store with every table in `schema`
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        let tables = schema
            .tables
            .iter()
            .map(|t| (t.name.clone(), TableData::default()))
            .collect();
        Self {
            inner: RwLock::new(Inner {
                schema,
                tables,
                opened: false,
            }),
            faults: RwLock::new(Faults::default()),
        }
    }

    /// Empty store with the application schema
    #[inline]
    #[must_use]
    pub fn genesis() -> Self {
        Self::new(Schema::genesis())
    }

    /// Load a snapshot into a store with `schema`
    ///
    /// Tables in the snapshot that the schema does not declare are created
    /// with an `id` primary key and no indexes.
    ///
    /// # Errors
    /// Fails if a row lacks its key or two rows share one.
    pub fn from_snapshot(schema: Schema, snapshot: Snapshot) -> StoreResult<Self> {
        let mut schema = schema;
        for name in snapshot.tables.keys() {
            if schema.get(name).is_none() {
                tracing::debug!(table = %name, "snapshot table not in schema, adding");
                schema.tables.push(TableSchema::parse(name.as_str(), "id"));
            }
        }

        let store = Self::new(schema);
        {
            let mut inner = store.inner.write();
            for (name, rows) in snapshot.tables {
                let table_schema = inner
                    .schema
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| StoreError::MissingTable(name.clone()))?;
                let data = inner.tables.entry(name).or_default();
                for row in rows {
                    insert_row(&table_schema, data, row, false)?;
                }
            }
        }
        Ok(store)
    }

    /// Copy every table into a snapshot
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.read();
        let tables = inner
            .tables
            .iter()
            .map(|(name, data)| (name.clone(), data.rows.values().cloned().collect()))
            .collect();
        Snapshot {
            version: inner.schema.version,
            tables,
        }
    }

    /// Schema the store was created with
    #[must_use]
    pub fn schema(&self) -> Schema {
        self.inner.read().schema.clone()
    }

    /// Replace the injected faults
    pub fn set_faults(&self, faults: Faults) {
        *self.faults.write() = faults;
    }

    /// Make the engine unavailable
    pub fn set_unavailable(&self, reason: impl Into<String>) {
        self.faults.write().engine_unavailable = Some(reason.into());
    }

    /// Make reads of `table` fail
    pub fn fail_reads(&self, table: &str) {
        self.faults.write().failing_reads.insert(table.to_string());
    }

    /// Make writes to `table` fail
    pub fn fail_writes(&self, table: &str) {
        self.faults.write().failing_writes.insert(table.to_string());
    }

    /// Remove every injected fault
    pub fn clear_faults(&self) {
        *self.faults.write() = Faults::default();
    }

    fn check_engine(&self) -> StoreResult<()> {
        match &self.faults.read().engine_unavailable {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn check_read(&self, table: &str) -> StoreResult<()> {
        self.check_engine()?;
        if self.faults.read().failing_reads.contains(table) {
            return Err(StoreError::Injected {
                table: table.to_string(),
                operation: "read",
                reason: "injected read failure".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self, table: &str) -> StoreResult<()> {
        self.check_engine()?;
        if self.faults.read().failing_writes.contains(table) {
            return Err(StoreError::Injected {
                table: table.to_string(),
                operation: "write",
                reason: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::genesis()
    }
}

fn table_schema<'a>(inner: &'a Inner, table: &str) -> StoreResult<&'a TableSchema> {
    inner
        .schema
        .get(table)
        .ok_or_else(|| StoreError::MissingTable(table.to_string()))
}

fn row_key(schema: &TableSchema, row: &Value) -> Option<String> {
    row.get(schema.primary_key.field()).and_then(key_string)
}

/// Insert one row, assigning an auto-increment key when needed
fn insert_row(
    schema: &TableSchema,
    data: &mut TableData,
    row: Value,
    replace: bool,
) -> StoreResult<String> {
    let Value::Object(mut object) = row else {
        return Err(StoreError::InvalidRecord(format!(
            "rows in `{}` must be objects",
            schema.name
        )));
    };

    let field = schema.primary_key.field();
    let key = match object.get(field).and_then(key_string) {
        Some(key) => key,
        None if schema.primary_key.is_auto_increment() => {
            data.next_auto += 1;
            object.insert(field.to_string(), Value::from(data.next_auto));
            data.next_auto.to_string()
        }
        None => {
            return Err(StoreError::MissingKey {
                table: schema.name.clone(),
                field: field.to_string(),
            })
        }
    };

    if !replace && data.rows.contains_key(&key) {
        return Err(StoreError::DuplicateKey {
            table: schema.name.clone(),
            key,
        });
    }

    if let Ok(n) = key.parse::<u64>() {
        data.next_auto = data.next_auto.max(n);
    }
    data.rows.insert(key.clone(), Value::Object(object));
    Ok(key)
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn open(&self) -> StoreResult<()> {
        self.check_engine()?;
        let mut inner = self.inner.write();
        if !inner.opened {
            inner.opened = true;
            tracing::debug!(version = inner.schema.version, "memory store opened");
        }
        Ok(())
    }

    async fn table_names(&self) -> StoreResult<Vec<String>> {
        self.check_engine()?;
        Ok(self.inner.read().tables.keys().cloned().collect())
    }

    async fn scan(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        self.check_read(table)?;
        let inner = self.inner.read();
        let schema = table_schema(&inner, table)?;
        if let Some(field) = query.field() {
            if !schema.is_indexed(field) {
                return Err(StoreError::NotIndexed {
                    table: table.to_string(),
                    field: field.to_string(),
                });
            }
        }
        let data = inner
            .tables
            .get(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        Ok(data
            .rows
            .values()
            .filter(|row| query.matches(row))
            .cloned()
            .collect())
    }

    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Value>> {
        self.check_read(table)?;
        let inner = self.inner.read();
        table_schema(&inner, table)?;
        Ok(inner
            .tables
            .get(table)
            .and_then(|data| data.rows.get(key))
            .cloned())
    }

    async fn count(&self, table: &str) -> StoreResult<usize> {
        self.check_read(table)?;
        let inner = self.inner.read();
        table_schema(&inner, table)?;
        Ok(inner.tables.get(table).map_or(0, |data| data.rows.len()))
    }

    async fn update(&self, table: &str, key: &str, patch: Map<String, Value>) -> StoreResult<bool> {
        self.check_write(table)?;
        let mut inner = self.inner.write();
        let pk = table_schema(&inner, table)?.primary_key.field().to_string();

        if let Some(new_key) = patch.get(&pk) {
            if key_string(new_key).as_deref() != Some(key) {
                return Err(StoreError::InvalidRecord(format!(
                    "update may not change primary key `{pk}` of `{table}`"
                )));
            }
        }

        let Some(Value::Object(row)) = inner
            .tables
            .get_mut(table)
            .and_then(|data| data.rows.get_mut(key))
        else {
            return Ok(false);
        };
        for (field, value) in patch {
            row.insert(field, value);
        }
        Ok(true)
    }

    async fn add(&self, table: &str, record: Value) -> StoreResult<String> {
        self.check_write(table)?;
        let mut inner = self.inner.write();
        let schema = table_schema(&inner, table)?.clone();
        let data = inner.tables.entry(table.to_string()).or_default();
        insert_row(&schema, data, record, false)
    }

    async fn bulk_add(&self, table: &str, records: Vec<Value>) -> StoreResult<Vec<String>> {
        self.check_write(table)?;
        let mut inner = self.inner.write();
        let schema = table_schema(&inner, table)?.clone();
        let data = inner.tables.entry(table.to_string()).or_default();

        let mut seen = BTreeSet::new();
        for record in &records {
            if let Some(key) = row_key(&schema, record) {
                if data.rows.contains_key(&key) || !seen.insert(key.clone()) {
                    return Err(StoreError::DuplicateKey {
                        table: table.to_string(),
                        key,
                    });
                }
            } else if !schema.primary_key.is_auto_increment() {
                return Err(StoreError::MissingKey {
                    table: table.to_string(),
                    field: schema.primary_key.field().to_string(),
                });
            }
            if !record.is_object() {
                return Err(StoreError::InvalidRecord(format!(
                    "rows in `{table}` must be objects"
                )));
            }
        }

        records
            .into_iter()
            .map(|record| insert_row(&schema, data, record, false))
            .collect()
    }

    async fn put(&self, table: &str, record: Value) -> StoreResult<String> {
        self.check_write(table)?;
        let mut inner = self.inner.write();
        let schema = table_schema(&inner, table)?.clone();
        let data = inner.tables.entry(table.to_string()).or_default();
        insert_row(&schema, data, record, true)
    }

    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool> {
        self.check_write(table)?;
        let mut inner = self.inner.write();
        table_schema(&inner, table)?;
        Ok(inner
            .tables
            .get_mut(table)
            .is_some_and(|data| data.rows.remove(key).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn add_then_scan_by_index() {
        let store = MemoryStore::genesis();
        store
            .add(tables::PRODUCTS, json!({"id": "p1", "active": 1, "price": 1.0}))
            .await
            .unwrap();
        store
            .add(tables::PRODUCTS, json!({"id": "p2", "active": 0, "price": 1.0}))
            .await
            .unwrap();

        let rows = store
            .scan(tables::PRODUCTS, &Query::where_field("active").equals(1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!("p1"));
    }

    #[tokio::test]
    async fn unindexed_where_is_rejected() {
        let store = MemoryStore::genesis();
        let err = store
            .scan(tables::PRODUCTS, &Query::where_field("price").equals(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotIndexed { .. }));
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected() {
        let store = MemoryStore::genesis();
        store.add(tables::SALES, json!({"id": "s1"})).await.unwrap();
        let err = store.add(tables::SALES, json!({"id": "s1"})).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn auto_increment_assigns_keys() {
        let store = MemoryStore::genesis();
        let k1 = store.add(tables::CUSTOMERS, json!({"name": "Ana"})).await.unwrap();
        let k2 = store.add(tables::CUSTOMERS, json!({"name": "Luis"})).await.unwrap();
        assert_eq!(k1, "1");
        assert_eq!(k2, "2");
        let row = store.get(tables::CUSTOMERS, "2").await.unwrap().unwrap();
        assert_eq!(row["id"], json!(2));
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryStore::genesis();
        store
            .add(tables::PRODUCTS, json!({"id": "p1", "stock": -2, "name": "Pan"}))
            .await
            .unwrap();
        let mut patch = Map::new();
        patch.insert("stock".into(), json!(0));
        assert!(store.update(tables::PRODUCTS, "p1", patch.clone()).await.unwrap());
        assert!(!store.update(tables::PRODUCTS, "nope", patch).await.unwrap());

        let row = store.get(tables::PRODUCTS, "p1").await.unwrap().unwrap();
        assert_eq!(row, json!({"id": "p1", "stock": 0, "name": "Pan"}));
    }

    #[tokio::test]
    async fn update_cannot_rekey() {
        let store = MemoryStore::genesis();
        store.add(tables::PRODUCTS, json!({"id": "p1"})).await.unwrap();
        let mut patch = Map::new();
        patch.insert("id".into(), json!("p9"));
        assert!(store.update(tables::PRODUCTS, "p1", patch).await.is_err());
    }

    #[tokio::test]
    async fn bulk_add_is_all_or_nothing() {
        let store = MemoryStore::genesis();
        store.add(tables::SALES, json!({"id": "s2"})).await.unwrap();
        let err = store
            .bulk_add(tables::SALES, vec![json!({"id": "s1"}), json!({"id": "s2"})])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(store.count(tables::SALES).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_table_reports_missing() {
        let store = MemoryStore::new(Schema::genesis().without(tables::ACCOUNTS));
        let err = store.scan(tables::ACCOUNTS, &Query::All).await.unwrap_err();
        assert!(err.is_missing_table());
        assert!(!store
            .table_names()
            .await
            .unwrap()
            .contains(&tables::ACCOUNTS.to_string()));
    }

    #[tokio::test]
    async fn faults_are_injected() {
        let store = MemoryStore::genesis();
        store.fail_reads(tables::SALES);
        assert!(store.scan(tables::SALES, &Query::All).await.is_err());
        assert!(store.scan(tables::PRODUCTS, &Query::All).await.is_ok());

        store.set_unavailable("blocked by browser");
        assert!(store.open().await.unwrap_err().is_unavailable());

        store.clear_faults();
        assert!(store.open().await.is_ok());
    }

    #[tokio::test]
    async fn snapshot_round_trip_keeps_rows() {
        let store = MemoryStore::genesis();
        store.add(tables::SALES, json!({"id": "s1", "total": 5})).await.unwrap();
        store.put(tables::SETTINGS, json!({"key": "k", "value": "1"})).await.unwrap();

        let restored = MemoryStore::from_snapshot(Schema::genesis(), store.snapshot()).unwrap();
        assert_eq!(restored.count(tables::SALES).await.unwrap(), 1);
        assert_eq!(
            restored.get(tables::SETTINGS, "k").await.unwrap(),
            Some(json!({"key": "k", "value": "1"}))
        );
    }
}
