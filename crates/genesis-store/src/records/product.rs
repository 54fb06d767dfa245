//! Product catalogue rows

use super::codec::{flag, lenient_f64, lenient_quantity, lenient_string, null_as_default, timestamp};
use crate::schema::tables;
use crate::table::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Product row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identity; empty when the row was written without one
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Sale price; `None` marks a corrupted row
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    /// Unit cost
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost: Option<f64>,
    /// Units on hand; fractional for goods sold by weight
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub stock: f64,
    /// Listed for sale
    #[serde(default, with = "flag")]
    pub active: bool,
    /// Soft-delete stamp
    #[serde(default, with = "timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Quarantined by the schema check
    #[serde(default, deserialize_with = "null_as_default")]
    pub corruption_detected: bool,
    /// Last automatic stock correction
    #[serde(default, with = "timestamp")]
    pub stock_corrected_at: Option<DateTime<Utc>>,
    /// Fields not modelled here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create an active product with zero stock
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: Some(price),
            cost: None,
            stock: 0.0,
            active: true,
            deleted_at: None,
            corruption_detected: false,
            stock_corrected_at: None,
            extra: Map::new(),
        }
    }

    /// With stock level
    #[inline]
    #[must_use]
    pub fn with_stock(mut self, stock: impl Into<f64>) -> Self {
        self.stock = stock.into();
        self
    }

    /// With unit cost
    #[inline]
    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Without a price
    #[inline]
    #[must_use]
    pub fn without_price(mut self) -> Self {
        self.price = None;
        self
    }

    /// Delisted
    #[inline]
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Row lacks an identity or a price
    #[inline]
    #[must_use]
    pub fn is_corrupted(&self) -> bool {
        self.id.trim().is_empty() || self.price.is_none()
    }
}

impl Record for Product {
    const TABLE: &'static str = tables::PRODUCTS;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Partial product update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    /// New stock level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    /// New active flag
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "flag::serialize_opt"
    )]
    pub active: Option<bool>,
    /// Soft-delete stamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Quarantine marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corruption_detected: Option<bool>,
    /// Stock correction stamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_corrected_at: Option<DateTime<Utc>>,
}

impl ProductPatch {
    /// Delist, soft-delete and mark as corrupted
    #[must_use]
    pub fn quarantine(at: DateTime<Utc>) -> Self {
        Self {
            active: Some(false),
            deleted_at: Some(at),
            corruption_detected: Some(true),
            ..Self::default()
        }
    }

    /// Reset stock to zero and stamp the correction
    #[must_use]
    pub fn clamp_stock(at: DateTime<Utc>) -> Self {
        Self {
            stock: Some(0),
            stock_corrected_at: Some(at),
            ..Self::default()
        }
    }
}
