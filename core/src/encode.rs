//! Recursive encoding of values into SQL literals.
//!
//! The encoder dispatches on the shape of a [`Value`]:
//!
//! | Shape | Output |
//! |-------|--------|
//! | NULL | `NULL` |
//! | text, bytes | quoted string literal (bytes that are not UTF-8 become `X'..'`) |
//! | int, uint, float, bool | canonical text (`42`, `0.1`, `1e+06`, `true`) |
//! | sequence | elements joined by `, `; nested sequences in parentheses |
//! | record, map | `` `key`=value `` pairs joined by `, ` |
//!
//! With `force_stringify` set, every non-NULL scalar is quoted as a string
//! instead. Sequence elements are always encoded that way, which is what makes
//! `VALUES ('1', 'a'), ('2', 'b')` come out right. Record values keep their
//! scalar form (``SET `id`=1, `name`='x'``) and must not be composites.
//!
//! # Example
//!
//! ```
//! use sqlstring_core::encode;
//!
//! let rows = vec![vec!["a", "b"], vec!["c", "d"]];
//! assert_eq!(encode(&rows, false).unwrap(), "('a', 'b'), ('c', 'd')");
//! assert_eq!(encode(&None::<i32>, false).unwrap(), "NULL");
//! ```

use serde::Serialize;

use crate::error::{Error, Result};
use crate::escape::Escaping;
use crate::quote::encode_identifier;
use crate::ser::{descend, to_value};
use crate::value::{Value, format_float, format_float32};

/// Literal encoder bound to one [`Escaping`] strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Encoder {
    escaping: Escaping,
}

impl Encoder {
    /// Backslash escaping, the MySQL default.
    pub const MYSQL: Self = Self::new(Escaping::Backslash);

    /// Quote doubling, for servers running with `NO_BACKSLASH_ESCAPES`.
    pub const NO_BACKSLASH_ESCAPES: Self = Self::new(Escaping::QuoteDoubling);

    /// Creates an encoder using `escaping` for string contents.
    pub const fn new(escaping: Escaping) -> Self {
        Self { escaping }
    }

    /// The escaping strategy this encoder uses.
    pub const fn escaping(&self) -> Escaping {
        self.escaping
    }

    /// Encodes any serializable value as a SQL literal.
    ///
    /// # Errors
    ///
    /// See [`to_value`] and [`Encoder::encode_value`].
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T, force_stringify: bool) -> Result<String> {
        self.encode_value(&to_value(value)?, force_stringify)
    }

    /// Encodes a [`Value`] as a SQL literal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StringConversion`] when a composite must be
    /// stringified (a record inside a sequence, a sequence inside a record),
    /// [`Error::UnsupportedType`] for non-finite floats, and
    /// [`Error::Internal`] when nesting exceeds [`MAX_DEPTH`](crate::MAX_DEPTH).
    pub fn encode_value(&self, value: &Value, force_stringify: bool) -> Result<String> {
        self.encode_at(value, force_stringify, 0)
    }

    /// Wraps `s` in quotes with this encoder's escaping.
    pub fn quote(&self, s: &str) -> String {
        self.escaping.quote(s)
    }

    fn encode_at(&self, value: &Value, force_stringify: bool, depth: usize) -> Result<String> {
        match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Bytes(b) => Ok(self.bytes_literal(b)),
            _ if force_stringify => Ok(self.quote(&value.as_string()?)),
            Value::Text(s) => Ok(self.quote(s)),
            Value::Sequence(items) => self.list(items, depth),
            Value::Record(fields) => self.assignments(fields, depth),
            Value::Int(i) => Ok(i.to_string()),
            Value::Uint(u) => Ok(u.to_string()),
            Value::Float(f) if f.is_finite() => Ok(format_float(*f)),
            Value::Float32(f) if f.is_finite() => Ok(format_float32(*f)),
            Value::Float(_) | Value::Float32(_) => Err(Error::UnsupportedType(format!(
                "non-finite float {value}"
            ))),
            Value::Bool(b) => Ok(b.to_string()),
        }
    }

    /// Text bytes are quoted; anything else becomes a hex literal.
    fn bytes_literal(&self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(s) => self.quote(s),
            Err(_) => format!("X'{}'", hex::encode(bytes)),
        }
    }

    fn list(&self, items: &[Value], depth: usize) -> Result<String> {
        let child = descend(depth)?;
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Sequence(inner) => parts.push(format!("({})", self.list(inner, child)?)),
                _ => parts.push(self.encode_at(item, true, child)?),
            }
        }
        Ok(parts.join(", "))
    }

    fn assignments(&self, fields: &[(String, Value)], depth: usize) -> Result<String> {
        let child = descend(depth)?;
        let mut parts = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            if matches!(value, Value::Sequence(_) | Value::Record(_)) {
                return Err(Error::StringConversion(format!(
                    "field `{name}` holds a {}",
                    value.kind()
                )));
            }
            let encoded = self.encode_at(value, false, child)?;
            parts.push(format!("{}={encoded}", encode_identifier(name, false)));
        }
        Ok(parts.join(", "))
    }
}

/// Encodes `value` with the default [`Encoder::MYSQL`].
///
/// # Errors
///
/// See [`Encoder::encode`].
pub fn encode<T: Serialize + ?Sized>(value: &T, force_stringify: bool) -> Result<String> {
    Encoder::MYSQL.encode(value, force_stringify)
}

/// Encodes a [`Value`] with the default [`Encoder::MYSQL`].
///
/// # Errors
///
/// See [`Encoder::encode_value`].
pub fn encode_value(value: &Value, force_stringify: bool) -> Result<String> {
    Encoder::MYSQL.encode_value(value, force_stringify)
}

/// Returns the canonical string form of any serializable scalar.
///
/// # Errors
///
/// Returns [`Error::StringConversion`] for composites, plus any error from
/// [`to_value`].
pub fn as_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    to_value(value)?.as_string()
}
