//! Customers

use super::codec::{flag, null_as_default};
use crate::schema::tables;
use crate::table::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Customer row; keys are assigned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identity, `None` before insertion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Listed
    #[serde(default, with = "flag")]
    pub active: bool,
    /// Fields not modelled here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    /// Create an active customer awaiting a key
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            active: true,
            extra: Map::new(),
        }
    }
}

impl Record for Customer {
    const TABLE: &'static str = tables::CUSTOMERS;

    fn key(&self) -> String {
        self.id.map(|id| id.to_string()).unwrap_or_default()
    }
}
