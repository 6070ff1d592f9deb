//! Closed set of field value types and their coercion into canonical values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueType {
    /// Number, string or boolean, kept as-is
    Any,
    Number,
    String,
    Boolean,
    /// RFC 3339 / ISO 8601 or RFC 2822 string, or epoch milliseconds
    Date,
    DateIso,
    DateOnly,
    DateTime,
    #[serde(rename = "date_unix_s")]
    #[strum(serialize = "date_unix_s")]
    DateUnixS,
    #[serde(rename = "date_unix_ms")]
    #[strum(serialize = "date_unix_ms")]
    DateUnixMs,
}

/// Kind of a canonical value, shared by every date variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    Date,
}

impl ValueType {
    /// Kind of the coerced value, `None` for `any`
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            ValueType::Any => None,
            ValueType::Number => Some(ValueKind::Number),
            ValueType::String => Some(ValueKind::String),
            ValueType::Boolean => Some(ValueKind::Boolean),
            ValueType::Date
            | ValueType::DateIso
            | ValueType::DateOnly
            | ValueType::DateTime
            | ValueType::DateUnixS
            | ValueType::DateUnixMs => Some(ValueKind::Date),
        }
    }

    pub fn is_date(&self) -> bool {
        self.kind() == Some(ValueKind::Date)
    }

    /// What a valid input looks like, used in error messages
    pub fn expected(&self) -> &'static str {
        match self {
            ValueType::Any => "a number, string or boolean",
            ValueType::Number => "a number",
            ValueType::String => "a string",
            ValueType::Boolean => "a boolean",
            ValueType::Date => "a date string or epoch milliseconds",
            ValueType::DateIso => "a date in format 'YYYY-MM-DDTHH:mm:ss.sssZ'",
            ValueType::DateOnly => "a date in format 'YYYY-MM-DD'",
            ValueType::DateTime => "a date in format 'YYYY-MM-DD 00:00:00'",
            ValueType::DateUnixS => "a valid unix timestamp in seconds",
            ValueType::DateUnixMs => "a valid unix timestamp in milliseconds",
        }
    }
}

/// Canonical in-memory value of a coerced field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Date(DateTime<Utc>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Date(_) => ValueKind::Date,
        }
    }

    /// Position of the value on a numeric line: the number itself, epoch
    /// milliseconds for dates, 0/1 for booleans, and the code point of the
    /// first character for strings (0 for an empty string).
    pub fn ordering_key(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::String(s) => s.chars().next().map(|c| c as u32 as f64).unwrap_or(0.0),
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Date(d) => d.timestamp_millis() as f64,
        }
    }

    /// Key used by discrete scales to identify a category
    pub fn category(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("Missing value")]
    Missing,

    #[error("Expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Expected {expected}, got '{input}'")]
    InvalidDate {
        expected: &'static str,
        input: String,
    },

    #[error("Timestamp {value} is outside the supported date range")]
    OutOfRange { value: f64 },
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn mismatch(ty: ValueType, raw: &JsonValue) -> CoercionError {
    CoercionError::TypeMismatch {
        expected: ty.expected(),
        found: json_kind(raw),
    }
}

/// Coerces a raw JSON field into the canonical value for `ty`.
///
/// `None` (field absent) and JSON `null` both report [`CoercionError::Missing`].
pub fn coerce(ty: ValueType, raw: Option<&JsonValue>) -> Result<Value, CoercionError> {
    let raw = match raw {
        None | Some(JsonValue::Null) => return Err(CoercionError::Missing),
        Some(raw) => raw,
    };

    match ty {
        ValueType::Any => match raw {
            JsonValue::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| mismatch(ty, raw)),
            JsonValue::String(s) => Ok(Value::String(s.clone())),
            JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
            _ => Err(mismatch(ty, raw)),
        },
        ValueType::Number => raw
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| mismatch(ty, raw)),
        ValueType::String => raw
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| mismatch(ty, raw)),
        ValueType::Boolean => raw
            .as_bool()
            .map(Value::Boolean)
            .ok_or_else(|| mismatch(ty, raw)),
        ValueType::Date => match raw {
            JsonValue::String(s) => parse_iso(s)
                .or_else(|| DateTime::parse_from_rfc2822(s.trim()).ok().map(|d| d.to_utc()))
                .map(Value::Date)
                .ok_or_else(|| invalid_date(ty, s)),
            JsonValue::Number(_) => from_epoch_millis(raw.as_f64(), ty, raw),
            _ => Err(mismatch(ty, raw)),
        },
        ValueType::DateIso | ValueType::DateOnly | ValueType::DateTime => {
            let s = raw.as_str().ok_or_else(|| mismatch(ty, raw))?;
            parse_iso(s).map(Value::Date).ok_or_else(|| invalid_date(ty, s))
        }
        ValueType::DateUnixS => from_epoch_millis(raw.as_f64().map(|s| s * 1000.0), ty, raw),
        ValueType::DateUnixMs => from_epoch_millis(raw.as_f64(), ty, raw),
    }
}

fn invalid_date(ty: ValueType, input: &str) -> CoercionError {
    CoercionError::InvalidDate {
        expected: ty.expected(),
        input: input.to_string(),
    }
}

fn from_epoch_millis(
    millis: Option<f64>,
    ty: ValueType,
    raw: &JsonValue,
) -> Result<Value, CoercionError> {
    let millis = millis
        .filter(|ms| ms.is_finite())
        .ok_or_else(|| mismatch(ty, raw))?;
    // `as` saturates, anything beyond i64 is rejected by chrono below
    DateTime::from_timestamp_millis(millis.round() as i64)
        .map(Value::Date)
        .ok_or(CoercionError::OutOfRange { value: millis })
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Lenient ISO 8601 parsing. Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and
/// date-times with optional seconds, fraction, `Z` or numeric offset.
/// Timestamps without an offset are taken as UTC.
pub fn parse_iso(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.to_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(d) = DateTime::parse_from_str(s, fmt) {
            return Some(d.to_utc());
        }
    }

    let naive = s.strip_suffix('Z').unwrap_or(s);
    for fmt in NAIVE_FORMATS {
        if let Ok(d) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(d.and_utc());
        }
    }

    let date = match naive.len() {
        4 => naive
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        7 => NaiveDate::parse_from_str(&format!("{naive}-01"), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(naive, "%Y-%m-%d").ok(),
    }?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;
    use std::str::FromStr;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[rstest]
    #[case("any", ValueType::Any)]
    #[case("number", ValueType::Number)]
    #[case("date_iso", ValueType::DateIso)]
    #[case("date_only", ValueType::DateOnly)]
    #[case("date_time", ValueType::DateTime)]
    #[case("date_unix_s", ValueType::DateUnixS)]
    #[case("date_unix_ms", ValueType::DateUnixMs)]
    fn test_type_names(#[case] name: &str, #[case] expected: ValueType) {
        assert_eq!(ValueType::from_str(name).unwrap(), expected);
        assert_eq!(expected.to_string(), name);
        assert_eq!(
            serde_json::from_value::<ValueType>(json!(name)).unwrap(),
            expected
        );
    }

    #[rstest]
    #[case(ValueType::DateIso, "2025-05-06T14:35:00Z", utc(2025, 5, 6, 14, 35, 0))]
    #[case(ValueType::DateIso, "2025-05-06T14:35:00.250+02:00", utc(2025, 5, 6, 12, 35, 0) + chrono::Duration::milliseconds(250))]
    #[case(ValueType::DateOnly, "2025-05-06", utc(2025, 5, 6, 0, 0, 0))]
    #[case(ValueType::DateTime, "2025-05-06 14:35:00", utc(2025, 5, 6, 14, 35, 0))]
    #[case(ValueType::DateTime, "2025-05-06T14:35", utc(2025, 5, 6, 14, 35, 0))]
    #[case(ValueType::Date, "2024-02", utc(2024, 2, 1, 0, 0, 0))]
    #[case(ValueType::Date, "1999", utc(1999, 1, 1, 0, 0, 0))]
    #[case(ValueType::Date, "Tue, 06 May 2025 14:42:10 +0100", utc(2025, 5, 6, 13, 42, 10))]
    fn test_date_strings(
        #[case] ty: ValueType,
        #[case] input: &str,
        #[case] expected: DateTime<Utc>,
    ) {
        assert_eq!(coerce(ty, Some(&json!(input))), Ok(Value::Date(expected)));
    }

    #[rstest]
    #[case(ValueType::DateUnixS, json!(1715066100), utc(2024, 5, 7, 7, 15, 0))]
    #[case(ValueType::DateUnixMs, json!(1715066100000_i64), utc(2024, 5, 7, 7, 15, 0))]
    #[case(ValueType::Date, json!(0), utc(1970, 1, 1, 0, 0, 0))]
    #[case(ValueType::DateUnixS, json!(-86400), utc(1969, 12, 31, 0, 0, 0))]
    fn test_epoch_numbers(
        #[case] ty: ValueType,
        #[case] input: JsonValue,
        #[case] expected: DateTime<Utc>,
    ) {
        assert_eq!(coerce(ty, Some(&input)), Ok(Value::Date(expected)));
    }

    #[test]
    fn test_invalid_dates_name_format() {
        let err = coerce(ValueType::DateOnly, Some(&json!("not a date"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected a date in format 'YYYY-MM-DD', got 'not a date'"
        );

        let err = coerce(ValueType::DateUnixS, Some(&json!("1715066100"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected a valid unix timestamp in seconds, got string"
        );
    }

    #[test]
    fn test_unix_out_of_range() {
        let err = coerce(ValueType::DateUnixS, Some(&json!(1e17))).unwrap_err();
        assert_eq!(err, CoercionError::OutOfRange { value: 1e20 });
        // implausible but representable timestamps are accepted
        assert!(coerce(ValueType::DateUnixMs, Some(&json!(1e15))).is_ok());
    }

    #[test]
    fn test_basic_types() {
        assert_eq!(coerce(ValueType::Number, Some(&json!(2.5))), Ok(Value::Number(2.5)));
        assert_eq!(
            coerce(ValueType::Number, Some(&json!("2.5"))),
            Err(CoercionError::TypeMismatch {
                expected: "a number",
                found: "string"
            })
        );
        assert_eq!(coerce(ValueType::Boolean, Some(&json!(true))), Ok(Value::Boolean(true)));
        assert_eq!(
            coerce(ValueType::String, Some(&json!("a"))),
            Ok(Value::String("a".to_string()))
        );
        assert_eq!(coerce(ValueType::Any, Some(&json!(false))), Ok(Value::Boolean(false)));
        assert!(coerce(ValueType::Any, Some(&json!([1]))).is_err());
    }

    #[test]
    fn test_missing() {
        assert_eq!(coerce(ValueType::Number, None), Err(CoercionError::Missing));
        assert_eq!(coerce(ValueType::String, Some(&JsonValue::Null)), Err(CoercionError::Missing));
    }

    #[test]
    fn test_ordering_key_and_category() {
        assert_eq!(Value::String("Apple".to_string()).ordering_key(), 65.0);
        assert_eq!(Value::String(String::new()).ordering_key(), 0.0);
        assert_eq!(Value::Boolean(true).ordering_key(), 1.0);
        let date = Value::Date(utc(1970, 1, 1, 0, 0, 1));
        assert_eq!(date.ordering_key(), 1000.0);
        assert_eq!(date.category(), "1970-01-01T00:00:01.000Z");
        assert_eq!(Value::Number(3.0).category(), "3");
    }

    #[test]
    fn test_serializes_canonical() {
        let values = vec![
            Value::Number(1.5),
            Value::String("a".to_string()),
            Value::Boolean(false),
            Value::Date(utc(2020, 1, 2, 3, 4, 5)),
        ];
        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!([1.5, "a", false, "2020-01-02T03:04:05Z"])
        );
    }
}
