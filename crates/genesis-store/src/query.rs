//! Indexed queries
//!
//! Mirrors the `where(field).equals(v)` / `.between(a, b)` shape of the
//! browser store. Records whose indexed field is missing or `null` are not
//! part of the index and never match a `where` clause.

use serde_json::Value;
use std::cmp::Ordering;

/// Query over one table
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Every row
    All,
    /// Rows whose field equals the value
    Equals {
        /// Indexed field
        field: String,
        /// Expected value
        value: Value,
    },
    /// Rows whose field lies in `[lower, upper)`
    Between {
        /// Indexed field
        field: String,
        /// Inclusive lower bound
        lower: Value,
        /// Exclusive upper bound
        upper: Value,
    },
}

impl Query {
    /// Query every row
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::All
    }

    /// Start a `where` clause on an indexed field
    #[inline]
    #[must_use]
    pub fn where_field(field: impl Into<String>) -> WhereClause {
        WhereClause {
            field: field.into(),
        }
    }

    /// Field the query is constrained on
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Equals { field, .. } | Self::Between { field, .. } => Some(field),
        }
    }

    /// Evaluate the query against one row
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Equals { field, value } => indexed_value(row, field)
                .is_some_and(|v| compare_values(v, value) == Some(Ordering::Equal)),
            Self::Between {
                field,
                lower,
                upper,
            } => indexed_value(row, field).is_some_and(|v| {
                matches!(
                    compare_values(v, lower),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && compare_values(v, upper) == Some(Ordering::Less)
            }),
        }
    }
}

/// Pending `where` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    field: String,
}

impl WhereClause {
    /// Match rows equal to `value`
    #[inline]
    #[must_use]
    pub fn equals(self, value: impl Into<Value>) -> Query {
        Query::Equals {
            field: self.field,
            value: value.into(),
        }
    }

    /// Match rows in `[lower, upper)`
    #[inline]
    #[must_use]
    pub fn between(self, lower: impl Into<Value>, upper: impl Into<Value>) -> Query {
        Query::Between {
            field: self.field,
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

fn indexed_value<'a>(row: &'a Value, field: &str) -> Option<&'a Value> {
    row.get(field).filter(|v| !v.is_null())
}

/// Order two index values; values of different kinds are incomparable
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
