//! Error types for encoding, extraction, and row decoding.
//!
//! Every failure is returned to the immediate caller. Nothing in this crate
//! logs or retries an error.

use std::backtrace::Backtrace;

use thiserror::Error;

/// Errors that can occur while encoding values or decoding rows.
#[derive(Debug, Error)]
pub enum Error {
    /// The value has a shape with no literal encoding.
    #[error("cannot escape this value: {0}")]
    UnsupportedType(String),

    /// The value has no canonical string form.
    #[error("cannot convert to string: {0}")]
    StringConversion(String),

    /// Unexpected failure while traversing a value.
    ///
    /// Carries the captured backtrace for diagnostics.
    #[error("internal error: {message}\n{trace}")]
    Internal {
        /// What went wrong.
        message: String,
        /// Backtrace captured at the point of failure.
        trace: String,
    },

    /// Failure reported by the cursor while reading a column.
    #[error("scan error: {0}")]
    Scan(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The number of scan slots does not match the result columns.
    #[error("expected {expected} destination slots in scan, found {found} columns")]
    ColumnCount {
        /// Number of slots supplied.
        expected: usize,
        /// Number of columns in the current result set.
        found: usize,
    },
}

impl Error {
    /// Builds an [`Error::Internal`] and captures the current backtrace.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Wraps a cursor failure into [`Error::Scan`].
    pub fn scan(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Scan(err.into())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::internal(msg.to_string())
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
