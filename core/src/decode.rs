//! Decoding query results into schema-less rows.
//!
//! Each decoder takes the cursor by value. The cursor is dropped, releasing
//! whatever it holds, on every return path including errors.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cursor::{Cursor, Slot};
use crate::error::{Error, Result};

/// A nullable string column with an explicit validity flag.
///
/// Serializes as an optional string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub struct NullString {
    /// Column text; empty when `valid` is false.
    pub string: String,
    /// `false` for SQL NULL.
    pub valid: bool,
}

impl NullString {
    /// A present value.
    pub fn new(string: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            valid: true,
        }
    }

    /// SQL NULL.
    pub fn null() -> Self {
        Self::default()
    }

    /// Returns `true` for SQL NULL.
    pub fn is_null(&self) -> bool {
        !self.valid
    }

    /// Borrows the text, `None` for SQL NULL.
    pub fn as_deref(&self) -> Option<&str> {
        self.valid.then_some(self.string.as_str())
    }
}

impl From<Option<String>> for NullString {
    fn from(value: Option<String>) -> Self {
        value.map_or_else(Self::null, Self::new)
    }
}

impl From<NullString> for Option<String> {
    fn from(value: NullString) -> Self {
        value.valid.then_some(value.string)
    }
}

impl fmt::Display for NullString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_deref() {
            Some(s) => f.write_str(s),
            None => f.write_str("NULL"),
        }
    }
}

impl Slot for NullString {
    fn from_raw(raw: Option<&[u8]>) -> Result<Self> {
        match raw {
            None => Ok(Self::null()),
            Some(bytes) => std::str::from_utf8(bytes)
                .map(Self::new)
                .map_err(Error::scan),
        }
    }
}

/// One decoded row: column name to slot.
///
/// When a result set repeats a column name, the last column wins.
pub type Row<S = NullString> = HashMap<String, S>;

/// Reads the first column of the first row.
///
/// Returns `Ok(None)` when there is no row, which is distinct from a row whose
/// column is NULL.
///
/// # Errors
///
/// Returns [`Error::ColumnCount`] unless the result has exactly one column,
/// or any error reported by the cursor.
pub fn single<S: Slot, C: Cursor>(mut cursor: C) -> Result<Option<S>> {
    if !cursor.advance()? {
        return Ok(None);
    }
    let mut slot = [S::default()];
    cursor.scan_into(&mut slot)?;
    let [value] = slot;
    Ok(Some(value))
}

/// Reads the first row as a column-name map.
///
/// Returns `Ok(None)` when there is no row, distinct from an empty map.
pub fn row<S: Slot, C: Cursor>(mut cursor: C) -> Result<Option<Row<S>>> {
    if !cursor.advance()? {
        return Ok(None);
    }
    let columns = cursor.column_names()?;
    scan_row(&cursor, &columns).map(Some)
}

/// Reads every row of the first result set.
///
/// An empty vector means the query produced no rows.
pub fn rows<S: Slot, C: Cursor>(mut cursor: C) -> Result<Vec<Row<S>>> {
    if !cursor.advance()? {
        return Ok(Vec::new());
    }
    let columns = cursor.column_names()?;
    read_group(&mut cursor, &columns)
}

/// Reads every result set, omitting sets with no rows.
///
/// A row whose columns are all NULL is still a row: `SELECT NULL; SELECT 1;
/// SELECT 2` yields three groups. Use [`set_rows_dense`] when output positions must line up with the
/// statements submitted.
pub fn set_rows<S: Slot, C: Cursor>(cursor: C) -> Result<Vec<Vec<Row<S>>>> {
    set_rows_with(cursor, false)
}

/// Reads every result set, keeping an empty group for sets with no rows.
///
/// The output has one group per result set.
pub fn set_rows_dense<S: Slot, C: Cursor>(cursor: C) -> Result<Vec<Vec<Row<S>>>> {
    set_rows_with(cursor, true)
}

fn set_rows_with<S: Slot, C: Cursor>(mut cursor: C, dense: bool) -> Result<Vec<Vec<Row<S>>>> {
    let mut groups = Vec::new();
    let mut index = 0usize;
    loop {
        let mut group = Vec::new();
        if cursor.advance()? {
            let columns = cursor.column_names()?;
            if !columns.is_empty() {
                group = read_group(&mut cursor, &columns)?;
            }
        }
        trace!(result_set = index, rows = group.len(), "decoded result set");
        if dense || !group.is_empty() {
            groups.push(group);
        }
        if !cursor.advance_result_set()? {
            break;
        }
        index += 1;
    }
    Ok(groups)
}

/// Scans the current row and every following row of the set.
fn read_group<S: Slot, C: Cursor>(cursor: &mut C, columns: &[String]) -> Result<Vec<Row<S>>> {
    let mut group = Vec::new();
    loop {
        group.push(scan_row(cursor, columns)?);
        if !cursor.advance()? {
            break;
        }
    }
    Ok(group)
}

fn scan_row<S: Slot, C: Cursor>(cursor: &C, columns: &[String]) -> Result<Row<S>> {
    let mut slots: Vec<S> = std::iter::repeat_with(S::default)
        .take(columns.len())
        .collect();
    cursor.scan_into(&mut slots)?;
    Ok(columns.iter().cloned().zip(slots).collect())
}
