//! SQL literal encoding and schema-less row decoding.
//!
//! This crate turns in-memory values into escaped MySQL literal text and
//! turns tabular query results back into generic rows:
//!
//! - [`escape_bytes_backslash`] / [`escape_bytes_quotes`] — byte escaping for
//!   the default and `NO_BACKSLASH_ESCAPES` dialects, selected at runtime
//!   through [`Escaping`].
//! - [`encode_string_literal`], [`encode_identifier`],
//!   [`encode_identifier_list`] — quoted string literals and backtick
//!   identifiers.
//! - [`encode`] / [`Encoder`] — the recursive value encoder. Inputs are
//!   normalized into the closed [`Value`] model by [`to_value`], which accepts
//!   any `serde::Serialize` type. Byte buffers go through [`Bytes`] /
//!   [`ByteBuf`] (or `#[serde(with = "serde_bytes")]` on a field); a bare
//!   `Vec<u8>` serializes as a sequence of integers.
//! - [`extract_fields_values`] — `identifier<suffix>` fragments plus raw
//!   values for prepared statements.
//! - [`single`], [`row`], [`rows`], [`set_rows`], [`set_rows_dense`] —
//!   decoders over any [`Cursor`].
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use sqlstring_core::*;
//!
//! assert_eq!(encode(&None::<i32>, false).unwrap(), "NULL");
//! assert_eq!(encode(&["x", "y"], false).unwrap(), "'x', 'y'");
//! assert_eq!(
//!     encode(&[["a", "b"], ["c", "d"]], false).unwrap(),
//!     "('a', 'b'), ('c', 'd')"
//! );
//!
//! let mut map = BTreeMap::new();
//! map.insert("id", 1);
//! assert_eq!(encode(&map, false).unwrap(), "`id`=1");
//!
//! assert_eq!(encode_identifier("a.b", false), "`a`.`b`");
//! assert_eq!(encode_identifier("a.b", true), "`a.b`");
//! ```

mod cursor;
mod decode;
mod encode;
mod error;
mod escape;
mod extract;
mod quote;
mod ser;
mod value;

pub use cursor::{BufferedCursor, Cursor, RawBytes, ResultSet, Slot};
pub use decode::{NullString, Row, row, rows, set_rows, set_rows_dense, single};
pub use encode::{Encoder, as_string, encode, encode_value};
pub use error::{Error, Result};
pub use escape::{
    Escaping, escape_bytes_backslash, escape_bytes_quotes, escape_string_backslash,
    escape_string_quotes,
};
pub use extract::{FieldValues, extract_fields_values, extract_from_value};
pub use quote::{encode_identifier, encode_identifier_list, encode_string_literal};
pub use ser::{MAX_DEPTH, to_value};
pub use value::Value;

pub use serde_bytes::{ByteBuf, Bytes};
