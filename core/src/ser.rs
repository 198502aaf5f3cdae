//! Serde adapter that normalizes any `Serialize` value into a [`Value`].
//!
//! Mapping:
//!
//! - `Option::None`, `()` → [`Value::Null`]; `Some(v)`, `Box`, `&`,
//!   newtype structs → the inner value (`Rc`/`Arc` with serde's `rc` feature)
//! - strings, chars, and anything serialized through `collect_str`
//!   (`Display` types such as timestamps) → [`Value::Text`]
//! - `serialize_bytes` → [`Value::Bytes`]. serde only calls it for
//!   `serde_bytes` types ([`Bytes`](crate::Bytes), [`ByteBuf`](crate::ByteBuf),
//!   fields marked `#[serde(with = "serde_bytes")]`); a plain `Vec<u8>` or
//!   `&[u8]` is a sequence of integers
//! - sequences, tuples, tuple structs → [`Value::Sequence`]
//! - structs → [`Value::Record`] in declaration order; `#[serde(skip)]`
//!   fields are absent
//! - maps → [`Value::Record`] in iteration order, keys converted with
//!   [`Value::as_string`]
//! - unit variants → their name as text; newtype variants → a one-entry
//!   record
//!
//! Tuple and struct variants, and 128-bit integers outside the 64-bit
//! range, are rejected with [`Error::UnsupportedType`].

use serde::ser::{self, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// Maximum nesting of containers and indirections.
pub const MAX_DEPTH: usize = 128;

/// Converts any serializable value into a [`Value`].
///
/// # Examples
///
/// ```
/// use serde::Serialize;
/// use sqlstring_core::{Value, to_value};
///
/// #[derive(Serialize)]
/// struct User {
///     id: u32,
///     name: Option<String>,
/// }
///
/// let value = to_value(&User { id: 3, name: None }).unwrap();
/// assert_eq!(
///     value,
///     Value::Record(vec![
///         ("id".into(), Value::Uint(3)),
///         ("name".into(), Value::Null),
///     ])
/// );
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for shapes with no [`Value`] form,
/// [`Error::StringConversion`] for map keys with no string form, and
/// [`Error::Internal`] when nesting exceeds [`MAX_DEPTH`] or the value's own
/// `Serialize` impl fails.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer { depth: 0 })
}

/// Depth of a child one level below `depth`.
///
/// The outermost value sits at depth 0. A child deeper than [`MAX_DEPTH`] is
/// an [`Error::Internal`], so conversion and encoding accept the same trees.
pub(crate) fn descend(depth: usize) -> Result<usize> {
    let child = depth + 1;
    if child > MAX_DEPTH {
        return Err(Error::internal(format!(
            "value nests deeper than {MAX_DEPTH} levels"
        )));
    }
    Ok(child)
}

fn nested<T: Serialize + ?Sized>(value: &T, depth: usize) -> Result<Value> {
    value.serialize(ValueSerializer { depth: descend(depth)? })
}

/// Serializer producing a [`Value`] tree.
#[derive(Debug, Clone, Copy)]
pub struct ValueSerializer {
    depth: usize,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = ser::Impossible<Value, Error>;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = ser::Impossible<Value, Error>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| Error::UnsupportedType(format!("i128 {v} is outside the 64-bit range")))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Uint(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Uint(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Uint(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Uint(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        u64::try_from(v)
            .map(Value::Uint)
            .map_err(|_| Error::UnsupportedType(format!("u128 {v} is outside the 64-bit range")))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::Text(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        nested(value, self.depth)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Record(Vec::new()))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::Text(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        nested(value, self.depth)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        let inner = nested(value, self.depth)?;
        Ok(Value::Record(vec![(variant.to_string(), inner)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder> {
        Ok(SeqBuilder {
            depth: self.depth,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::UnsupportedType(format!(
            "tuple variant {name}::{variant}"
        )))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder> {
        Ok(MapBuilder {
            depth: self.depth,
            fields: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::UnsupportedType(format!(
            "struct variant {name}::{variant}"
        )))
    }
}

/// Collects sequence and tuple elements.
#[derive(Debug)]
pub struct SeqBuilder {
    depth: usize,
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(nested(value, self.depth)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Sequence(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

/// Collects struct fields and map entries.
#[derive(Debug)]
pub struct MapBuilder {
    depth: usize,
    fields: Vec<(String, Value)>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        let key = nested(key, self.depth)?.as_string()?;
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::internal("map value serialized before its key"))?;
        self.fields.push((key, nested(value, self.depth)?));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Record(self.fields))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.fields
            .push((key.to_string(), nested(value, self.depth)?));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Record(self.fields))
    }
}
