//! Ledger accounts

use super::codec::{lenient_f64, lenient_string, null_as_default};
use crate::schema::tables;
use crate::table::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Classification derived from the numeric account code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountClass {
    /// Codes 1000-1999
    Asset,
    /// Codes 2000-2999
    Liability,
    /// Codes 3000-3999
    Equity,
    /// Anything else (income, expenses, unparsable codes)
    Other,
}

impl AccountClass {
    /// Classify a numeric code
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1000..=1999 => Self::Asset,
            2000..=2999 => Self::Liability,
            3000..=3999 => Self::Equity,
            _ => Self::Other,
        }
    }
}

/// Ledger account row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Identity
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Chart-of-accounts code, e.g. `"1100"`
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Free-form type marker written by the application
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    /// Current balance
    #[serde(default, deserialize_with = "lenient_f64")]
    pub balance: Option<f64>,
    /// Fields not modelled here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    /// Create an account with a balance
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, balance: f64) -> Self {
        let code = code.into();
        Self {
            id: format!("acc_{code}"),
            code,
            name: name.into(),
            account_type: None,
            balance: Some(balance),
            extra: Map::new(),
        }
    }

    /// Leading integer of the code, read the way `parseInt` would
    ///
    /// `"1100"` and `"1100.10"` both give 1100; `"caja"` gives `None`.
    #[must_use]
    pub fn code_number(&self) -> Option<i64> {
        let trimmed = self.code.trim_start();
        let (sign, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let end = digits
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(digits.len(), |(i, _)| i);
        digits[..end].parse::<i64>().ok().map(|n| sign * n)
    }

    /// Classification by code range
    #[inline]
    #[must_use]
    pub fn class(&self) -> AccountClass {
        self.code_number().map_or(AccountClass::Other, AccountClass::from_code)
    }

    /// Balance, with a missing balance read as zero
    #[inline]
    #[must_use]
    pub fn balance_or_zero(&self) -> f64 {
        self.balance.unwrap_or(0.0)
    }
}

impl Record for Account {
    const TABLE: &'static str = tables::ACCOUNTS;

    fn key(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_number_reads_leading_integer() {
        assert_eq!(Account::new("1100", "Caja", 0.0).code_number(), Some(1100));
        assert_eq!(Account::new(" 2100.5", "x", 0.0).code_number(), Some(2100));
        assert_eq!(Account::new("31-A", "x", 0.0).code_number(), Some(31));
        assert_eq!(Account::new("caja", "x", 0.0).code_number(), None);
        assert_eq!(Account::new("", "x", 0.0).code_number(), None);
    }

    #[test]
    fn class_by_code_range() {
        assert_eq!(Account::new("1000", "x", 0.0).class(), AccountClass::Asset);
        assert_eq!(Account::new("1999", "x", 0.0).class(), AccountClass::Asset);
        assert_eq!(Account::new("2000", "x", 0.0).class(), AccountClass::Liability);
        assert_eq!(Account::new("3500", "x", 0.0).class(), AccountClass::Equity);
        assert_eq!(Account::new("4000", "x", 0.0).class(), AccountClass::Other);
        assert_eq!(Account::new("999", "x", 0.0).class(), AccountClass::Other);
        assert_eq!(Account::new("n/a", "x", 0.0).class(), AccountClass::Other);
    }
}
