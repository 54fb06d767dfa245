//! Typed table access

use crate::error::{StoreError, StoreResult};
use crate::query::Query;
use crate::store::{key_string, RecordStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Entity persisted in a known table
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table holding this entity
    const TABLE: &'static str;

    /// Field holding the primary key in raw rows
    const KEY_FIELD: &'static str = "id";

    /// Primary key as indexed by the store
    fn key(&self) -> String;
}

/// Rows that decoded, and raw rows that did not
#[derive(Debug, Clone)]
pub struct Decoded<R> {
    /// Rows read as `R`
    pub records: Vec<R>,
    /// Rows left undecoded, in scan order
    pub rejected: Vec<Rejected>,
}

impl<R> Default for Decoded<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Raw row that did not match its record type
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    /// Primary key, when the row has a usable one
    pub key: Option<String>,
    /// Row as stored
    pub row: Value,
    /// Why decoding failed
    pub reason: String,
}

/// Typed view of one table
pub struct Table<'a, R, S: ?Sized = dyn RecordStore> {
    store: &'a S,
    _record: PhantomData<fn() -> R>,
}

impl<R, S: ?Sized> std::fmt::Debug for Table<'_, R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").field("name", &std::any::type_name::<R>()).finish()
    }
}

impl<'a, R, S> Table<'a, R, S>
where
    R: Record,
    S: RecordStore + ?Sized,
{
    /// Wrap a store
    #[inline]
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Table name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        R::TABLE
    }

    /// Every row
    pub async fn to_vec(&self) -> StoreResult<Vec<R>> {
        self.query(&Query::All).await
    }

    /// Every row, or nothing if the table does not exist
    pub async fn to_vec_or_empty(&self) -> StoreResult<Vec<R>> {
        match self.to_vec().await {
            Err(e) if e.is_missing_table() => {
                tracing::debug!(table = R::TABLE, "table absent, reading as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Rows matching an indexed query
    pub async fn query(&self, query: &Query) -> StoreResult<Vec<R>> {
        self.store
            .scan(R::TABLE, query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Rows matching an indexed query, decoded one by one
    ///
    /// A row that does not decode is set aside in [`Decoded::rejected`]
    /// instead of failing the whole read.
    ///
    /// # Errors
    /// Only failures of the underlying scan.
    pub async fn query_lossy(&self, query: &Query) -> StoreResult<Decoded<R>> {
        let mut decoded = Decoded::default();
        for row in self.store.scan(R::TABLE, query).await? {
            match serde_json::from_value::<R>(row.clone()) {
                Ok(record) => decoded.records.push(record),
                Err(e) => {
                    let key = row
                        .get(R::KEY_FIELD)
                        .and_then(key_string)
                        .filter(|k| !k.is_empty());
                    tracing::warn!(
                        table = R::TABLE,
                        key = key.as_deref().unwrap_or("<none>"),
                        error = %e,
                        "row does not decode"
                    );
                    decoded.rejected.push(Rejected {
                        key,
                        row,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(decoded)
    }

    /// Every row, decoded one by one; see [`Table::query_lossy`]
    pub async fn to_vec_lossy(&self) -> StoreResult<Decoded<R>> {
        self.query_lossy(&Query::All).await
    }

    /// Rows matching an indexed query and a client-side predicate
    pub async fn query_filtered<F>(&self, query: &Query, predicate: F) -> StoreResult<Vec<R>>
    where
        F: Fn(&R) -> bool + Send,
    {
        let rows = self.query(query).await?;
        Ok(rows.into_iter().filter(|r| predicate(r)).collect())
    }

    /// Rows accepted by a client-side predicate
    pub async fn filter<F>(&self, predicate: F) -> StoreResult<Vec<R>>
    where
        F: Fn(&R) -> bool + Send,
    {
        self.query_filtered(&Query::All, predicate).await
    }

    /// Row by primary key
    pub async fn get(&self, key: &str) -> StoreResult<Option<R>> {
        self.store.get(R::TABLE, key).await?.map(decode).transpose()
    }

    /// Number of rows
    pub async fn count(&self) -> StoreResult<usize> {
        self.store.count(R::TABLE).await
    }

    /// Merge a partial record into the row with `key`
    ///
    /// `patch` must serialize to a JSON object; `None` fields should be
    /// skipped so they leave the stored value untouched.
    pub async fn update<P: Serialize + Sync>(&self, key: &str, patch: &P) -> StoreResult<bool> {
        let patch = encode_object(patch)?;
        self.store.update(R::TABLE, key, patch).await
    }

    /// Insert a new row
    pub async fn add(&self, record: &R) -> StoreResult<String> {
        self.store.add(R::TABLE, serde_json::to_value(record)?).await
    }

    /// Insert several rows atomically
    pub async fn bulk_add(&self, records: &[R]) -> StoreResult<Vec<String>> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.store.bulk_add(R::TABLE, values).await
    }

    /// Insert or replace a row
    pub async fn put(&self, record: &R) -> StoreResult<String> {
        self.store.put(R::TABLE, serde_json::to_value(record)?).await
    }
}

fn decode<R: Record>(value: Value) -> StoreResult<R> {
    serde_json::from_value(value).map_err(StoreError::from)
}

fn encode_object<P: Serialize>(patch: &P) -> StoreResult<Map<String, Value>> {
    match serde_json::to_value(patch)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidRecord(format!(
            "patch must be an object, got {other}"
        ))),
    }
}

/// Typed table access for any store
pub trait RecordStoreExt: RecordStore {
    /// Typed view of the table holding `R`
    #[inline]
    fn table<R: Record>(&self) -> Table<'_, R, Self> {
        Table::new(self)
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}
