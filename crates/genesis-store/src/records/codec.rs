//! Field codecs for rows written by the browser application
//!
//! Rows in the wild carry `null` where a value is expected, `0`/`1` for
//! flags and empty strings for unset timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Deserialize `null` (or a missing field, with `#[serde(default)]`) as `T::default()`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accept a string or a number, rendering numbers as their decimal text
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) | None => String::new(),
    })
}

/// Optional number that may arrive as numeric text; anything else reads as `None`
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Some(Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_)) | None => None,
    })
}

/// Quantity that may arrive as numeric text or fractional; unreadable values read as zero
pub(crate) fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_f64(deserializer).map(Option::unwrap_or_default)
}

/// Integer flag stored as `0`/`1`, accepting booleans on read
pub(crate) mod flag {
    use super::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(crate) fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    #[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
    pub(crate) fn serialize_opt<S: Serializer>(
        value: &Option<bool>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(b) => serializer.serialize_u8(u8::from(*b)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => matches!(s.as_str(), "1" | "true"),
            Value::Null | Value::Array(_) | Value::Object(_) => false,
        })
    }
}

/// Optional RFC 3339 timestamp where `""` means unset
pub(crate) mod timestamp {
    use super::{DateTime, Deserialize, Deserializer, Serializer, Utc};
    use chrono::{NaiveDate, NaiveDateTime, TimeZone};
    use serde::de::Error;
    use serde_json::Value;

    #[allow(clippy::ref_option)]
    pub(crate) fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n
                .as_i64()
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single())),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => parse(s.trim())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unrecognised timestamp `{s}`"))),
            Some(other) => Err(D::Error::custom(format!("unrecognised timestamp {other}"))),
        }
    }

    /// RFC 3339, or a naive date-time / date read as UTC
    fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::null_as_default")]
        name: String,
        #[serde(default, with = "super::flag")]
        active: bool,
        #[serde(default, with = "super::timestamp")]
        deleted_at: Option<DateTime<Utc>>,
    }

    #[test]
    fn decodes_browser_shaped_rows() {
        let row: Row = serde_json::from_value(json!({
            "name": null,
            "active": 1,
            "deleted_at": ""
        }))
        .unwrap();
        assert_eq!(row.name, "");
        assert!(row.active);
        assert!(row.deleted_at.is_none());
    }

    #[test]
    fn encodes_flags_as_integers() {
        let row = Row {
            name: "x".into(),
            active: false,
            deleted_at: None,
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["active"], json!(0));
        assert!(v["deleted_at"].is_null());
    }

    #[test]
    fn lenient_string_accepts_numbers() {
        #[derive(Deserialize)]
        struct Code {
            #[serde(default, deserialize_with = "super::lenient_string")]
            code: String,
        }
        let c: Code = serde_json::from_value(json!({"code": 1100})).unwrap();
        assert_eq!(c.code, "1100");
        let c: Code = serde_json::from_value(json!({"code": null})).unwrap();
        assert_eq!(c.code, "");
    }

    #[test]
    fn reads_common_timestamp_shapes() {
        for raw in [
            json!("2024-03-01T10:00:00Z"),
            json!("2024-03-01 10:00:00"),
            json!("2024-03-01T10:00:00.250"),
            json!(1_709_287_200_000_i64),
        ] {
            let row: Row = serde_json::from_value(json!({ "deleted_at": raw.clone() })).unwrap();
            let ts = row.deleted_at.unwrap_or_else(|| panic!("{raw} should parse"));
            assert_eq!(ts.format("%Y-%m-%d %H").to_string(), "2024-03-01 10");
        }
        let row: Row = serde_json::from_value(json!({"deleted_at": "2024-03-01"})).unwrap();
        assert!(row.deleted_at.is_some());
    }

    #[test]
    fn lenient_numbers() {
        #[derive(Deserialize)]
        struct Priced {
            #[serde(default, deserialize_with = "super::lenient_f64")]
            price: Option<f64>,
            #[serde(default, deserialize_with = "super::lenient_quantity")]
            stock: f64,
        }
        let p: Priced = serde_json::from_value(json!({"price": " 12.50 ", "stock": "-2.5"})).unwrap();
        assert_eq!(p.price, Some(12.5));
        assert!((p.stock + 2.5).abs() < f64::EPSILON);
        let p: Priced = serde_json::from_value(json!({"price": "n/a", "stock": null})).unwrap();
        assert!(p.price.is_none());
        assert!(p.stock.abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_malformed_timestamps() {
        let err = serde_json::from_value::<Row>(json!({"deleted_at": "yesterday"}));
        assert!(err.is_err());
    }
}
