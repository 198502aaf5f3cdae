//! Error types for the SQLite convenience layer.
//!
//! Covers database access, value encoding and row decoding, configuration
//! files, and argument validation.

use thiserror::Error;

/// Errors that can occur while running statements through a [`Database`](crate::Database).
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Literal encoding, field extraction, or row decoding failure.
    #[error("codec error: {0}")]
    CodecError(#[from] sqlstring_core::Error),

    /// Configuration file I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON configuration parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML configuration parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A write helper received no columns to set or match.
    #[error("{0}: data is empty")]
    EmptyData(&'static str),

    /// Configuration values that cannot be combined.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A parameter value that SQLite cannot bind.
    #[error("unsupported parameter: {0}")]
    UnsupportedParameter(String),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
