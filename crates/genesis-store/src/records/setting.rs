//! Key-value settings

use crate::schema::tables;
use crate::table::Record;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings row
///
/// `value` normally holds JSON text; rows written by older code may hold a
/// bare scalar instead, which [`Setting::decode`] also accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Setting key
    pub key: String,
    /// Stored value
    #[serde(default)]
    pub value: Value,
}

impl Setting {
    /// Store `value` as JSON text under `key`
    ///
    /// # Errors
    /// Returns the encoder error if `value` cannot be serialized.
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            key: key.into(),
            value: Value::String(serde_json::to_string(value)?),
        })
    }

    /// Store a raw value under `key`
    #[must_use]
    pub fn raw(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Check if nothing usable is stored
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Decode the stored value
    ///
    /// # Errors
    /// Returns the decoder error if the value does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.value {
            Value::String(text) => serde_json::from_str(text),
            other => serde_json::from_value(other.clone()),
        }
    }
}

impl Record for Setting {
    const TABLE: &'static str = tables::SETTINGS;
    const KEY_FIELD: &'static str = "key";

    fn key(&self) -> String {
        self.key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_setting_decodes() {
        let s = Setting::json("ai_config", &json!({"provider": "gemini"})).unwrap();
        assert!(s.value.is_string());
        let v: Value = s.decode().unwrap();
        assert_eq!(v["provider"], "gemini");
    }

    #[test]
    fn blank_values() {
        assert!(Setting::raw("k", Value::Null).is_blank());
        assert!(Setting::raw("k", "  ").is_blank());
        assert!(!Setting::raw("k", true).is_blank());
    }

    #[test]
    fn raw_bool_decodes() {
        let flag: bool = Setting::raw("proxy_enabled", true).decode().unwrap();
        assert!(flag);
    }
}
