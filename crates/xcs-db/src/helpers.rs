//! Row parsing and value conversion helpers.
//!
//! Repos convert `libsql::Row` (column-indexed) into typed entities and
//! `FieldValue`s into `libsql::Value` parameters. Datetimes may be stored in
//! either `SQLite`'s `datetime('now')` format or RFC 3339.

use chrono::{DateTime, Utc};
use xcs_core::value::FieldValue;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all xcs-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a column of any affinity as a `FieldValue`. Blobs are decoded as
/// lossy UTF-8 text.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_field_value(row: &libsql::Row, idx: i32) -> Result<FieldValue, DatabaseError> {
    Ok(from_sql_value(row.get_value(idx)?))
}

#[must_use]
pub fn from_sql_value(value: libsql::Value) -> FieldValue {
    match value {
        libsql::Value::Null => FieldValue::Null,
        libsql::Value::Integer(v) => FieldValue::Integer(v),
        libsql::Value::Real(v) => FieldValue::Real(v),
        libsql::Value::Text(v) => FieldValue::Text(v),
        libsql::Value::Blob(bytes) => FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

#[must_use]
pub fn to_sql_value(value: FieldValue) -> libsql::Value {
    match value {
        FieldValue::Null => libsql::Value::Null,
        FieldValue::Integer(v) => libsql::Value::Integer(v),
        FieldValue::Real(v) => libsql::Value::Real(v),
        FieldValue::Text(v) => libsql::Value::Text(v),
    }
}

/// Optional text as a SQL parameter (`NULL` when absent).
#[must_use]
pub fn opt_text(value: Option<&str>) -> libsql::Value {
    value.map_or(libsql::Value::Null, |v| libsql::Value::Text(v.to_string()))
}

/// Optional integer as a SQL parameter (`NULL` when absent).
#[must_use]
pub fn opt_integer(value: Option<i64>) -> libsql::Value {
    value.map_or(libsql::Value::Null, libsql::Value::Integer)
}

/// Quote an identifier for interpolation into SQL.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xcs_core::enums::FileStatus;

    #[test]
    fn parses_both_datetime_formats() {
        let a = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let b = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn parses_status_enum() {
        let status: FileStatus = parse_enum("changed").unwrap();
        assert_eq!(status, FileStatus::Changed);
        assert!(parse_enum::<FileStatus>("2").is_err());
    }

    #[test]
    fn sql_value_conversion_is_symmetric() {
        for value in [
            FieldValue::Null,
            FieldValue::Integer(-3),
            FieldValue::Real(1.5),
            FieldValue::from("P 1"),
        ] {
            assert_eq!(from_sql_value(to_sql_value(value.clone())), value);
        }
        assert_eq!(
            from_sql_value(libsql::Value::Blob(b"abc".to_vec())),
            FieldValue::from("abc")
        );
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("mainTable"), "\"mainTable\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
