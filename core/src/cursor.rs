//! Cursor abstraction over tabular query results.
//!
//! A [`Cursor`] starts positioned before the first row of the first result
//! set. [`advance`](Cursor::advance) moves through rows of the current set,
//! [`advance_result_set`](Cursor::advance_result_set) moves to the next set
//! of a multi-statement query. Column bytes are borrowed from the cursor and
//! are only valid until the next advance; keep a copy with [`RawBytes`] or
//! [`NullString`](crate::NullString) to retain them.

use crate::error::{Error, Result};

/// A result cursor produced by a statement execution collaborator.
pub trait Cursor {
    /// Moves to the next row of the current result set.
    ///
    /// Returns `false` once the set is exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Column names of the current result set, in order.
    fn column_names(&self) -> Result<Vec<String>>;

    /// Number of columns in the current result set.
    fn column_count(&self) -> Result<usize> {
        Ok(self.column_names()?.len())
    }

    /// Raw bytes of column `index` in the current row, `None` for SQL NULL.
    fn column(&self, index: usize) -> Result<Option<&[u8]>>;

    /// Moves to the next result set.
    ///
    /// Returns `false` when there are no more sets.
    fn advance_result_set(&mut self) -> Result<bool>;

    /// Reads the current row into `slots`, one slot per column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnCount`] if the slot count differs from the
    /// column count, or the slot's own conversion error.
    fn scan_into<S: Slot>(&self, slots: &mut [S]) -> Result<()>
    where
        Self: Sized,
    {
        let found = self.column_count()?;
        if found != slots.len() {
            return Err(Error::ColumnCount {
                expected: slots.len(),
                found,
            });
        }
        for (index, slot) in slots.iter_mut().enumerate() {
            *slot = S::from_raw(self.column(index)?)?;
        }
        Ok(())
    }
}

/// A destination for one scanned column.
pub trait Slot: Sized + Default {
    /// Builds the slot from the column's raw bytes.
    fn from_raw(raw: Option<&[u8]>) -> Result<Self>;
}

/// Owned copy of a column's uninterpreted bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawBytes(pub Option<Vec<u8>>);

impl RawBytes {
    /// Returns `true` for SQL NULL.
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the bytes, `None` for SQL NULL.
    pub fn as_deref(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }
}

impl Slot for RawBytes {
    fn from_raw(raw: Option<&[u8]>) -> Result<Self> {
        Ok(Self(raw.map(<[u8]>::to_vec)))
    }
}

/// One result set held in memory.
///
/// A set with no columns (the result of a non-query statement) is distinct
/// from a set with columns but no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// Column names in order.
    pub columns: Vec<String>,
    /// Rows, each holding one entry per column.
    pub rows: Vec<Vec<Option<Vec<u8>>>>,
}

impl ResultSet {
    /// Creates a result set from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<Vec<u8>>>>) -> Self {
        Self { columns, rows }
    }

    /// A set with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A cursor over result sets already held in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedCursor {
    sets: Vec<ResultSet>,
    set: usize,
    row: Option<usize>,
}

impl BufferedCursor {
    /// Creates a cursor positioned before the first row of the first set.
    pub fn new(sets: Vec<ResultSet>) -> Self {
        Self {
            sets,
            set: 0,
            row: None,
        }
    }

    /// Number of result sets held.
    pub fn result_set_count(&self) -> usize {
        self.sets.len()
    }

    fn current_set(&self) -> Option<&ResultSet> {
        self.sets.get(self.set)
    }

    fn current_row(&self) -> Result<&[Option<Vec<u8>>]> {
        let row = self
            .row
            .and_then(|row| self.current_set()?.rows.get(row))
            .ok_or_else(|| Error::scan("cursor is not positioned on a row"))?;
        Ok(row)
    }
}

impl Cursor for BufferedCursor {
    fn advance(&mut self) -> Result<bool> {
        let Some(len) = self.current_set().map(|set| set.rows.len()) else {
            return Ok(false);
        };
        let next = self.row.map_or(0, |row| row + 1);
        if next < len {
            self.row = Some(next);
            Ok(true)
        } else {
            self.row = Some(len);
            Ok(false)
        }
    }

    fn column_names(&self) -> Result<Vec<String>> {
        Ok(self
            .current_set()
            .map(|set| set.columns.clone())
            .unwrap_or_default())
    }

    fn column_count(&self) -> Result<usize> {
        Ok(self.current_set().map_or(0, |set| set.columns.len()))
    }

    fn column(&self, index: usize) -> Result<Option<&[u8]>> {
        let row = self.current_row()?;
        let cell = row.get(index).ok_or_else(|| {
            Error::scan(format!(
                "column index {index} out of range for {} columns",
                row.len()
            ))
        })?;
        Ok(cell.as_deref())
    }

    fn advance_result_set(&mut self) -> Result<bool> {
        if self.set + 1 < self.sets.len() {
            self.set += 1;
            self.row = None;
            Ok(true)
        } else {
            self.set = self.sets.len();
            self.row = None;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<Vec<u8>> {
        Some(s.as_bytes().to_vec())
    }

    #[test]
    fn test_buffered_cursor_walks_rows_and_sets() {
        let mut cursor = BufferedCursor::new(vec![
            ResultSet::new(vec!["a".into()], vec![vec![cell("1")], vec![None]]),
            ResultSet::new(vec!["b".into(), "c".into()], vec![vec![cell("x"), cell("y")]]),
        ]);
        assert_eq!(cursor.result_set_count(), 2);

        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.column(0).unwrap(), Some(&b"1"[..]));
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.column(0).unwrap(), None);
        assert!(!cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());

        assert!(cursor.advance_result_set().unwrap());
        assert_eq!(cursor.column_names().unwrap(), vec!["b", "c"]);
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.column(1).unwrap(), Some(&b"y"[..]));
        assert!(!cursor.advance().unwrap());

        assert!(!cursor.advance_result_set().unwrap());
        assert!(!cursor.advance().unwrap());
        assert!(cursor.column_names().unwrap().is_empty());
    }

    #[test]
    fn test_column_before_advance_is_scan_error() {
        let cursor = BufferedCursor::new(vec![ResultSet::new(
            vec!["a".into()],
            vec![vec![cell("1")]],
        )]);
        assert!(matches!(cursor.column(0), Err(Error::Scan(_))));
    }

    #[test]
    fn test_column_out_of_range() {
        let mut cursor = BufferedCursor::new(vec![ResultSet::new(
            vec!["a".into()],
            vec![vec![cell("1")]],
        )]);
        cursor.advance().unwrap();
        assert!(matches!(cursor.column(3), Err(Error::Scan(_))));
    }

    #[test]
    fn test_scan_into_checks_slot_count() {
        let mut cursor = BufferedCursor::new(vec![ResultSet::new(
            vec!["a".into(), "b".into()],
            vec![vec![cell("1"), None]],
        )]);
        cursor.advance().unwrap();

        let mut one = [RawBytes::default()];
        assert!(matches!(
            cursor.scan_into(&mut one),
            Err(Error::ColumnCount {
                expected: 1,
                found: 2
            })
        ));

        let mut two = [RawBytes::default(), RawBytes::default()];
        cursor.scan_into(&mut two).unwrap();
        assert_eq!(two[0].as_deref(), Some(&b"1"[..]));
        assert!(two[1].is_null());
    }

    #[test]
    fn test_empty_cursor() {
        let mut cursor = BufferedCursor::new(Vec::new());
        assert!(!cursor.advance().unwrap());
        assert!(!cursor.advance_result_set().unwrap());
        assert_eq!(cursor.column_count().unwrap(), 0);
    }
}
