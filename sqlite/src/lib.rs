//! SQLite convenience layer for `sqlstring-core`.
//!
//! This crate wires the literal encoder and the row decoders to an embedded
//! SQLite database through `rusqlite`.
//!
//! # Architecture
//!
//! - **`config`** — serde-backed connection settings, loaded from YAML or JSON
//! - **`convert`** — parameter binding and raw column bytes
//! - **`cursor`** — [`SqliteCursor`], buffering the result sets of a query
//! - **`query`** — [`Database`], the read and write helpers
//!
//! # Quick start
//!
//! ```no_run
//! use sqlstring_core::params;
//! use sqlstring_sqlite::{Config, Database};
//!
//! let config = Config::load("sqlstring.yml").unwrap();
//! let db = Database::open(&config).unwrap();
//!
//! for row in db.rows("SELECT id, name FROM users WHERE active = ?", params![true]).unwrap() {
//!     println!("{} => {}", row["id"], row["name"]);
//! }
//! ```
//!
//! # Escaping
//!
//! Write helpers splice values into statement text with the escaping chosen
//! in [`Config::escaping`]. SQLite reads backslashes literally, so the
//! default is quote doubling; backslash escaping is only correct for text
//! that ends up on a MySQL server.

mod config;
mod convert;
mod cursor;
mod error;
mod query;

pub use config::Config;
pub use cursor::SqliteCursor;
pub use error::{Result, SqliteError};
pub use query::{Database, ExecResult};
