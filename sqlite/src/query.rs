//! Schema-less reads and literal-built writes over one SQLite connection.
//!
//! [`Database`] wraps a [`Connection`] and exposes the read helpers
//! (`single`, `row`, `rows`, `set_rows`, `set_rows_nil`) on top of the row
//! decoders, plus write helpers that assemble statement text with the
//! literal encoder and bind values through placeholders.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use sqlstring_core::params;
//! use sqlstring_sqlite::Database;
//!
//! let db = Database::open_in_memory().unwrap();
//! db.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", &[]).unwrap();
//! db.insert("users", &["id", "name"], &[(1, "Vinh"), (2, "Lan")]).unwrap();
//!
//! let name = db.single("SELECT name FROM users WHERE id = ?", params![2]).unwrap();
//! assert_eq!(name.unwrap().as_deref(), Some("Lan"));
//!
//! let mut data = BTreeMap::new();
//! data.insert("name", "Vinh Updated");
//! let mut key = BTreeMap::new();
//! key.insert("id", 1);
//! assert_eq!(db.update("users", &data, &key, None).unwrap(), 1);
//! ```

use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use sqlstring_core::{
    Encoder, FieldValues, NullString, Row, Value, encode_identifier, encode_identifier_list,
    extract_fields_values,
};
use tracing::debug;

use crate::config::Config;
use crate::convert;
use crate::cursor::SqliteCursor;
use crate::error::{Result, SqliteError};

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows changed by the statement (the last one, for a batch).
    pub rows_affected: u64,
    /// Rowid of the most recent successful insert on this connection.
    pub last_insert_id: i64,
}

/// A SQLite connection with schema-less read and write helpers.
///
/// # Examples
///
/// ```no_run
/// use sqlstring_sqlite::{Config, Database};
///
/// let mut config = Config::with_path("app.db");
/// config.multi_statements = true;
/// let db = Database::open(&config).unwrap();
///
/// let groups = db
///     .set_rows_nil("SELECT 1 WHERE 0; SELECT 1 AS one; SELECT 2 AS two;")
///     .unwrap();
/// assert_eq!(groups.len(), 3);
/// assert!(groups[0].is_empty());
/// ```
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    config: Config,
    encoder: Encoder,
}

impl Database {
    /// Opens the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](SqliteError::InvalidConfig) for settings
    /// that cannot be combined, or [`DatabaseError`](SqliteError::DatabaseError)
    /// if SQLite cannot open the file.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let conn = match &config.path {
            Some(path) => Connection::open_with_flags(path, config.open_flags())?,
            None => Connection::open_in_memory_with_flags(config.open_flags())?,
        };
        Self::from_connection(conn, config.clone())
    }

    /// Opens a private in-memory database with default settings.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&Config::default())
    }

    /// Loads a configuration file and opens the database it describes.
    pub fn open_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(&Config::load(path)?)
    }

    /// Wraps an existing connection, applying the connection-level settings
    /// of `config` (busy timeout, foreign keys). Open flags are ignored.
    pub fn from_connection(conn: Connection, config: Config) -> Result<Self> {
        conn.busy_timeout(config.busy_timeout())?;
        conn.execute_batch(if config.foreign_keys {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        })?;
        let encoder = Encoder::new(config.escaping);
        Ok(Self {
            conn,
            config,
            encoder,
        })
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the wrapper and returns the connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// The settings this database was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The literal encoder used by the write helpers.
    pub fn encoder(&self) -> Encoder {
        self.encoder
    }

    /// Runs a query and returns a cursor over its result sets.
    ///
    /// With `multi_statements` enabled and no parameters, every
    /// `;`-separated statement runs and produces its own result set.
    /// Otherwise `sql` must be a single statement.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`](SqliteError::DatabaseError) if preparing or
    /// stepping a statement fails, or
    /// [`UnsupportedParameter`](SqliteError::UnsupportedParameter) for a
    /// composite parameter.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<SqliteCursor> {
        debug!(sql, params = params.len(), "Running query");
        if self.config.multi_statements && params.is_empty() {
            SqliteCursor::batch(&self.conn, sql)
        } else {
            SqliteCursor::statement(&self.conn, sql, params)
        }
    }

    /// Reads the single column of the first row.
    ///
    /// `Ok(None)` means no row; a NULL column is `Some` with an invalid
    /// [`NullString`].
    pub fn single(&self, sql: &str, params: &[Value]) -> Result<Option<NullString>> {
        Ok(sqlstring_core::single(self.query(sql, params)?)?)
    }

    /// Reads the first row as a column-name map, `Ok(None)` if there is none.
    pub fn row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(sqlstring_core::row(self.query(sql, params)?)?)
    }

    /// Reads every row of the first result set.
    pub fn rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        Ok(sqlstring_core::rows(self.query(sql, params)?)?)
    }

    /// Reads the rows of every statement, leaving out statements with no rows.
    ///
    /// A row of NULLs still counts, so `SELECT NULL; SELECT 1` gives two groups.
    pub fn set_rows(&self, sql: &str) -> Result<Vec<Vec<Row>>> {
        Ok(sqlstring_core::set_rows(self.query(sql, &[])?)?)
    }

    /// Reads the rows of every statement, one group per statement.
    ///
    /// Statements with no rows keep their position as an empty group.
    pub fn set_rows_nil(&self, sql: &str) -> Result<Vec<Vec<Row>>> {
        Ok(sqlstring_core::set_rows_dense(self.query(sql, &[])?)?)
    }

    /// Runs a statement that returns no rows.
    ///
    /// With `multi_statements` enabled and no parameters, `sql` may hold
    /// several statements; `rows_affected` then reports the last one.
    pub fn exec(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        debug!(sql, params = params.len(), "Executing statement");
        let rows_affected = if self.config.multi_statements && params.is_empty() {
            self.conn.execute_batch(sql)?;
            self.conn.changes()
        } else {
            let params = convert::to_sql_values(params)?;
            let mut stmt = self.conn.prepare(sql)?;
            stmt.execute(params_from_iter(params.iter()))? as u64
        };
        Ok(ExecResult {
            rows_affected,
            last_insert_id: self.conn.last_insert_rowid(),
        })
    }

    /// Inserts `rows` into `table` and returns the last inserted rowid.
    ///
    /// `rows` is a sequence of rows, each a sequence of values in `columns`
    /// order. Values are spliced in as escaped literals.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`](SqliteError::CodecError) if `rows` cannot be
    /// encoded, or [`DatabaseError`](SqliteError::DatabaseError) if the
    /// insert fails.
    pub fn insert<T, S>(&self, table: &str, columns: &[S], rows: &T) -> Result<i64>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let sql = self.insert_sql(table, columns, rows)?;
        Ok(self.exec_literal(&sql)?.last_insert_id)
    }

    /// Inserts `rows`, overwriting every listed column of rows whose key
    /// already exists. Returns the number of rows inserted or updated.
    pub fn insert_update<T, S>(&self, table: &str, columns: &[S], rows: &T) -> Result<u64>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let assignments: Vec<String> = columns
            .iter()
            .map(|column| {
                let column = encode_identifier(column.as_ref(), true);
                format!("{column}=excluded.{column}")
            })
            .collect();
        let sql = format!(
            "{} ON CONFLICT DO UPDATE SET {}",
            self.insert_sql(table, columns, rows)?,
            assignments.join(", ")
        );
        Ok(self.exec_literal(&sql)?.rows_affected)
    }

    /// Updates rows of `table`, setting the fields of `data` on rows matching
    /// every field of `filter`. Returns the number of rows changed.
    ///
    /// `data` and `filter` are structs or maps; their values are bound as
    /// parameters. An empty `filter` updates every row. `limit` caps the
    /// number of rows touched.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyData`](SqliteError::EmptyData) if `data` has no fields.
    pub fn update<D, W>(&self, table: &str, data: &D, filter: &W, limit: Option<u64>) -> Result<u64>
    where
        D: Serialize + ?Sized,
        W: Serialize + ?Sized,
    {
        let set = extract_fields_values(data, "=?")?;
        if set.is_empty() {
            return Err(SqliteError::EmptyData("update"));
        }
        let filter = extract_fields_values(filter, "=?")?;

        let table = encode_identifier(table, true);
        let sql = format!(
            "UPDATE {table} SET {}{}",
            set.join(","),
            where_clause(&table, &filter, limit)
        );

        let mut values = set.values;
        values.extend(filter.values);
        self.exec_prepared(&sql, &values)
    }

    /// Deletes rows of `table` matching every field of `filter`. Returns the
    /// number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyData`](SqliteError::EmptyData) if `filter` has no
    /// fields; deleting every row needs an explicit [`exec`](Self::exec).
    pub fn delete<W>(&self, table: &str, filter: &W, limit: Option<u64>) -> Result<u64>
    where
        W: Serialize + ?Sized,
    {
        let filter = extract_fields_values(filter, "=?")?;
        if filter.is_empty() {
            return Err(SqliteError::EmptyData("delete"));
        }

        let table = encode_identifier(table, false);
        let sql = format!("DELETE FROM {table}{}", where_clause(&table, &filter, limit));
        self.exec_prepared(&sql, &filter.values)
    }

    fn insert_sql<T, S>(&self, table: &str, columns: &[S], rows: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let values = splice_nul(self.encoder.encode(rows, false)?);
        Ok(format!(
            "INSERT INTO {} ({}) VALUES {values}",
            encode_identifier(table, false),
            encode_identifier_list(columns, true)
        ))
    }

    fn exec_literal(&self, sql: &str) -> Result<ExecResult> {
        debug!(sql, "Executing statement");
        let rows_affected = self.conn.execute(sql, [])? as u64;
        Ok(ExecResult {
            rows_affected,
            last_insert_id: self.conn.last_insert_rowid(),
        })
    }

    fn exec_prepared(&self, sql: &str, values: &[Value]) -> Result<u64> {
        debug!(sql, params = values.len(), "Executing statement");
        let params = convert::to_sql_values(values)?;
        let mut stmt = self.conn.prepare(sql)?;
        Ok(stmt.execute(params_from_iter(params.iter()))? as u64)
    }
}

/// Rewrites raw NUL characters in encoded literals as `char(0)`.
///
/// SQLite ends a quoted token at NUL. Backslash escaping never leaves a raw
/// NUL, and under quote doubling one can only sit inside a `'...'` literal, so
/// closing the literal around it and concatenating keeps the text intact.
fn splice_nul(literals: String) -> String {
    if !literals.contains('\0') {
        return literals;
    }
    literals.replace('\0', "' || char(0) || '")
}

/// Builds the `WHERE` part of an update or delete.
///
/// SQLite only accepts `LIMIT` on these statements when compiled with
/// `SQLITE_ENABLE_UPDATE_DELETE_LIMIT`, so a limit goes through a rowid
/// subquery instead.
fn where_clause(table: &str, filter: &FieldValues, limit: Option<u64>) -> String {
    let conditions = filter.join(" and ");
    match (limit, filter.is_empty()) {
        (None, true) => String::new(),
        (None, false) => format!(" WHERE {conditions}"),
        (Some(limit), true) => {
            format!(" WHERE rowid IN (SELECT rowid FROM {table} LIMIT {limit})")
        }
        (Some(limit), false) => format!(
            " WHERE rowid IN (SELECT rowid FROM {table} WHERE {conditions} LIMIT {limit})"
        ),
    }
}
