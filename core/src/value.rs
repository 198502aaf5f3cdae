//! The closed value model every input is normalized into.
//!
//! [`Value`] is the only shape the encoder and extractor understand. Any
//! `serde::Serialize` type is converted into it by [`to_value`](crate::to_value);
//! values can also be built directly through the `From` impls or the
//! [`params!`](crate::params) macro.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{Error, Result};

/// A runtime value that can be encoded as a SQL literal or bound as a
/// statement parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// UTF-8 text.
    Text(String),
    /// Raw byte buffer, treated as a string.
    Bytes(Vec<u8>),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Double precision float.
    Float(f64),
    /// Single precision float, kept apart so it renders with `f32` digits.
    Float32(f32),
    /// Boolean.
    Bool(bool),
    /// Array, slice, tuple, or set.
    Sequence(Vec<Value>),
    /// Struct fields in declaration order, or map entries in iteration order.
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Float32(_) => "float32",
            Self::Bool(_) => "bool",
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
        }
    }

    /// Returns the canonical string form of a scalar.
    ///
    /// NULL renders as `"NULL"`, text as itself, bytes as their UTF-8 text,
    /// numbers and booleans in their canonical textual form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StringConversion`] for sequences, records, and bytes
    /// that are not valid UTF-8.
    pub fn as_string(&self) -> Result<String> {
        match self {
            Self::Null => Ok("NULL".to_string()),
            Self::Text(s) => Ok(s.clone()),
            Self::Bytes(b) => String::from_utf8(b.clone())
                .map_err(|_| Error::StringConversion("bytes are not valid UTF-8".to_string())),
            Self::Int(i) => Ok(i.to_string()),
            Self::Uint(u) => Ok(u.to_string()),
            Self::Float(f) => Ok(format_float(*f)),
            Self::Float32(f) => Ok(format_float32(*f)),
            Self::Bool(b) => Ok(b.to_string()),
            Self::Sequence(_) | Self::Record(_) => Err(Error::StringConversion(format!(
                "{} has no string form",
                self.kind()
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "<{}>", self.kind()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(<$target>::from(v))
                }
            }
        )*
    };
}

impl_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    f64 => Float as f64,
    f32 => Float32 as f32,
    bool => Bool as bool,
    String => Text as String,
    &str => Text as String,
    Vec<u8> => Bytes as Vec<u8>,
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::Uint(v as u64)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_bytes(b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Uint(u) => serializer.serialize_u64(*u),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Float32(f) => serializer.serialize_f32(*f),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Builds a `&[Value]` parameter list.
///
/// Usage: `params![42, "text", None::<i64>]`
#[macro_export]
macro_rules! params {
    ($($val:expr),* $(,)?) => {
        &[$($crate::Value::from($val)),*] as &[$crate::Value]
    };
}

/// Formats an `f64` the way Go's `strconv.FormatFloat(f, 'g', -1, 64)` does.
///
/// Shortest round-trip digits; exponent form when the decimal exponent is
/// below -4 or at least 6 (`1e+06`, `1.5e-07`), plain form otherwise.
pub(crate) fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return non_finite(f.is_nan(), f.is_sign_negative());
    }
    format_general(&format!("{f:e}"))
}

/// Same as [`format_float`] with `f32` shortest digits.
pub(crate) fn format_float32(f: f32) -> String {
    if !f.is_finite() {
        return non_finite(f.is_nan(), f.is_sign_negative());
    }
    format_general(&format!("{f:e}"))
}

fn non_finite(nan: bool, negative: bool) -> String {
    match (nan, negative) {
        (true, _) => "NaN".to_string(),
        (false, true) => "-Inf".to_string(),
        (false, false) => "+Inf".to_string(),
    }
}

/// Rewrites Rust's `{:e}` output (`-1.2345e6`) into `%g` shortest form.
fn format_general(sci: &str) -> String {
    let (negative, sci) = match sci.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, sci),
    };
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    let nd = digits.len() as i32;

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }

    if exp < -4 || exp >= 6 {
        out.push(digits[0] as char);
        if digits.len() > 1 {
            out.push('.');
            out.extend(digits[1..].iter().map(|&d| d as char));
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        let abs = exp.unsigned_abs();
        if abs < 10 {
            out.push('0');
        }
        out.push_str(&abs.to_string());
        return out;
    }

    // Decimal point sits after `dp` digits.
    let dp = exp + 1;
    let digit_at = |i: i32| -> char {
        if i >= 0 && i < nd {
            digits[i as usize] as char
        } else {
            '0'
        }
    };

    if dp > 0 {
        for i in 0..dp {
            out.push(digit_at(i));
        }
    } else {
        out.push('0');
    }

    let frac = (nd - dp).max(0);
    if frac > 0 {
        out.push('.');
        for i in 0..frac {
            out.push(digit_at(dp + i));
        }
    }
    out
}
