//! Result cursor over SQLite statements.
//!
//! Rows are read eagerly into memory. A `rusqlite::Rows` borrows its
//! statement, and a multi-statement batch prepares each statement only after
//! the previous one finished, so the cursor owns copies of every result set
//! instead of live statement handles.

use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::{Connection, Params, Statement, params_from_iter};
use sqlstring_core::{BufferedCursor, Cursor, ResultSet, Value};
use tracing::debug;

use crate::convert;
use crate::error::Result;

/// A [`Cursor`] over the result sets of one query.
#[derive(Debug, Clone, Default)]
pub struct SqliteCursor {
    inner: BufferedCursor,
}

impl SqliteCursor {
    /// Runs a single statement with bound parameters.
    pub(crate) fn statement(conn: &Connection, sql: &str, params: &[Value]) -> Result<Self> {
        let params = convert::to_sql_values(params)?;
        let mut stmt = conn.prepare(sql)?;
        let set = read_result_set(&mut stmt, params_from_iter(params.iter()))?;
        Ok(Self::from_sets(vec![set]))
    }

    /// Runs every `;`-separated statement in `sql`, one result set each.
    pub(crate) fn batch(conn: &Connection, sql: &str) -> Result<Self> {
        let mut batch = rusqlite::Batch::new(conn, sql);
        let mut sets = Vec::new();
        while let Some(mut stmt) = batch.next()? {
            sets.push(read_result_set(&mut stmt, [])?);
        }
        debug!(result_sets = sets.len(), "Batch finished");
        Ok(Self::from_sets(sets))
    }

    fn from_sets(sets: Vec<ResultSet>) -> Self {
        Self {
            inner: BufferedCursor::new(sets),
        }
    }

    /// Number of result sets the query produced.
    pub fn result_set_count(&self) -> usize {
        self.inner.result_set_count()
    }
}

impl Cursor for SqliteCursor {
    fn advance(&mut self) -> sqlstring_core::Result<bool> {
        self.inner.advance()
    }

    fn column_names(&self) -> sqlstring_core::Result<Vec<String>> {
        self.inner.column_names()
    }

    fn column_count(&self) -> sqlstring_core::Result<usize> {
        self.inner.column_count()
    }

    fn column(&self, index: usize) -> sqlstring_core::Result<Option<&[u8]>> {
        self.inner.column(index)
    }

    fn advance_result_set(&mut self) -> sqlstring_core::Result<bool> {
        self.inner.advance_result_set()
    }
}

fn read_result_set<P: Params>(stmt: &mut Statement<'_>, params: P) -> Result<ResultSet> {
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            cells.push(convert::raw_bytes(row.get_ref(index)?));
        }
        out.push(cells);
    }
    Ok(ResultSet::new(columns, out))
}
