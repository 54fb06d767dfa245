//! Sales and their line items

use super::codec::{lenient_f64, lenient_string, null_as_default, timestamp};
use crate::schema::tables;
use crate::table::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sale header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Identity
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// When the sale was recorded
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Stored total
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total: Option<f64>,
    /// Void stamp
    #[serde(default, with = "timestamp")]
    pub voided_at: Option<DateTime<Utc>>,
    /// Fields not modelled here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sale {
    /// Create a sale with a stored total
    #[must_use]
    pub fn new(id: impl Into<String>, total: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: Some(created_at),
            total: Some(total),
            voided_at: None,
            extra: Map::new(),
        }
    }

    /// Voided at the given time
    #[inline]
    #[must_use]
    pub fn voided(mut self, at: DateTime<Utc>) -> Self {
        self.voided_at = Some(at);
        self
    }

    /// Check if the sale was voided
    #[inline]
    #[must_use]
    pub fn is_voided(&self) -> bool {
        self.voided_at.is_some()
    }

    /// Stored total, with a missing total read as zero
    #[inline]
    #[must_use]
    pub fn total_or_zero(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }
}

impl Record for Sale {
    const TABLE: &'static str = tables::SALES;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Sale line item row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Identity
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Parent sale
    #[serde(default, deserialize_with = "lenient_string")]
    pub sale_id: String,
    /// Product sold
    #[serde(default)]
    pub product_id: Option<String>,
    /// Unit price
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    /// Units
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    /// Soft-delete stamp
    #[serde(default, with = "timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Flagged by the orphan check
    #[serde(default, deserialize_with = "null_as_default")]
    pub orphan_detected: bool,
    /// Fields not modelled here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SaleItem {
    /// Create a line item
    #[must_use]
    pub fn new(id: impl Into<String>, sale_id: impl Into<String>, price: f64, quantity: f64) -> Self {
        Self {
            id: id.into(),
            sale_id: sale_id.into(),
            product_id: None,
            price: Some(price),
            quantity: Some(quantity),
            deleted_at: None,
            orphan_detected: false,
            extra: Map::new(),
        }
    }

    /// For a product
    #[inline]
    #[must_use]
    pub fn for_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    /// Check if the item was soft-deleted
    #[inline]
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// `price * quantity`, with missing values read as zero
    #[inline]
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price.unwrap_or(0.0) * self.quantity.unwrap_or(0.0)
    }
}

impl Record for SaleItem {
    const TABLE: &'static str = tables::SALE_ITEMS;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Partial line item update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaleItemPatch {
    /// Soft-delete stamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Orphan marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphan_detected: Option<bool>,
}

impl SaleItemPatch {
    /// Soft-delete and mark as orphaned
    #[must_use]
    pub fn orphaned(at: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(at),
            orphan_detected: Some(true),
        }
    }
}
