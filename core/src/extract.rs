//! Splitting records into column fragments and parameter values.
//!
//! Used to build prepared statements such as
//! ``UPDATE `t` SET `a`=?,`b`=? WHERE `id`=?``: the fragments go into the
//! SQL text, the raw values are bound to the placeholders.

use serde::Serialize;

use crate::error::Result;
use crate::quote::encode_identifier;
use crate::ser::to_value;
use crate::value::Value;

/// Parallel lists of escaped `identifier<suffix>` fragments and raw values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    /// Escaped identifiers, each followed by the suffix.
    pub fields: Vec<String>,
    /// Unencoded values, one per field, for placeholder binding.
    pub values: Vec<Value>,
}

impl FieldValues {
    /// Returns `true` when no field was extracted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of extracted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Joins the field fragments with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.fields.join(separator)
    }
}

/// Extracts fields and raw values from a struct or map.
///
/// Struct fields come out in declaration order; map entries in the map's own
/// iteration order. Identifiers are quoted with qualification forbidden, so a
/// key like `a.b` stays one column name. Any other shape yields empty lists.
///
/// # Examples
///
/// ```
/// use serde::Serialize;
/// use sqlstring_core::{Value, extract_fields_values};
///
/// #[derive(Serialize)]
/// #[allow(non_snake_case)]
/// struct Key {
///     ID: i32,
/// }
///
/// let fv = extract_fields_values(&Key { ID: 3 }, "=?").unwrap();
/// assert_eq!(fv.fields, vec!["`ID`=?"]);
/// assert_eq!(fv.values, vec![Value::Int(3)]);
/// ```
///
/// # Errors
///
/// Returns any error from [`to_value`], such as a map key with no string
/// form.
pub fn extract_fields_values<T: Serialize + ?Sized>(data: &T, suffix: &str) -> Result<FieldValues> {
    Ok(extract_from_value(to_value(data)?, suffix))
}

/// Same as [`extract_fields_values`] for an already-built [`Value`].
pub fn extract_from_value(data: Value, suffix: &str) -> FieldValues {
    let Value::Record(entries) = data else {
        return FieldValues::default();
    };

    let mut out = FieldValues {
        fields: Vec::with_capacity(entries.len()),
        values: Vec::with_capacity(entries.len()),
    };
    for (name, value) in entries {
        out.fields.push(encode_identifier(&name, true) + suffix);
        out.values.push(value);
    }
    out
}
