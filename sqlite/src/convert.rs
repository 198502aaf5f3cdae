//! Conversion between [`Value`] parameters and SQLite storage values.
//!
//! Parameters go in as native SQLite values. Columns come back as the raw
//! bytes the row decoders expect: text and blobs unchanged, numbers in their
//! canonical text form.

use rusqlite::types::{Value as SqlValue, ValueRef};
use sqlstring_core::Value;

use crate::error::{Result, SqliteError};

/// Converts one parameter into a bindable SQLite value.
///
/// Booleans bind as `0`/`1`. Unsigned integers must fit in `i64`.
pub(crate) fn to_sql_value(value: &Value) -> Result<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Uint(u) => SqlValue::Integer(i64::try_from(*u).map_err(|_| {
            SqliteError::UnsupportedParameter(format!("{u} does not fit in a 64-bit signed integer"))
        })?),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Float32(f) => SqlValue::Real(f64::from(*f)),
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Sequence(_) | Value::Record(_) => {
            return Err(SqliteError::UnsupportedParameter(format!(
                "a {} cannot be bound to a placeholder",
                value.kind()
            )));
        }
    })
}

/// Converts a parameter list, failing on the first unbindable value.
pub(crate) fn to_sql_values(values: &[Value]) -> Result<Vec<SqlValue>> {
    values.iter().map(to_sql_value).collect()
}

/// Raw column bytes for the decoders, `None` for NULL.
pub(crate) fn raw_bytes(value: ValueRef<'_>) -> Option<Vec<u8>> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string().into_bytes()),
        ValueRef::Real(f) => Some(Value::Float(f).to_string().into_bytes()),
        ValueRef::Text(t) => Some(t.to_vec()),
        ValueRef::Blob(b) => Some(b.to_vec()),
    }
}
