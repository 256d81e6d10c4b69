use crate::model::FieldType;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Float(x) => write!(f, "{}", x),
            SqlValue::Text(s) => write!(f, "{:?}", s),
            SqlValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Converts a JSON argument to a bind value for a column of `field_type`.
/// The error is a short reason suitable for a client-facing message.
pub fn convert_value(value: &Value, field_type: FieldType) -> Result<SqlValue, String> {
    match (field_type, value) {
        (_, Value::Null) => Err("null is not a comparable value".to_string()),
        (FieldType::Integer, Value::Number(n)) => n
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| n.as_f64().map(SqlValue::Float))
            .ok_or_else(|| format!("{} is out of range", n)),
        (FieldType::Float, Value::Number(n)) => n
            .as_f64()
            .map(SqlValue::Float)
            .ok_or_else(|| format!("{} is out of range", n)),
        (FieldType::Text, Value::String(s)) => Ok(SqlValue::Text(s.clone())),
        (FieldType::Boolean, Value::Bool(b)) => Ok(SqlValue::Bool(*b)),
        (FieldType::Boolean, Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(SqlValue::Bool(false)),
            Some(1) => Ok(SqlValue::Bool(true)),
            _ => Err(format!("expected a boolean, got {}", n)),
        },
        (FieldType::Timestamp, Value::String(s)) => parse_timestamp(s).map(SqlValue::Text),
        (expected, other) => Err(format!(
            "expected {}, got {}",
            describe(expected),
            json_kind(other)
        )),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare date and normalises to
/// the storage format.
pub fn parse_timestamp(s: &str) -> Result<String, String> {
    let s = s.trim();
    let parsed = chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|_| format!("\"{}\" is not a valid timestamp", s))?;
    Ok(parsed.format(TIMESTAMP_FORMAT).to_string())
}

fn describe(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Integer | FieldType::Float => "a number",
        FieldType::Text => "a string",
        FieldType::Boolean => "a boolean",
        FieldType::Timestamp => "a timestamp string",
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
