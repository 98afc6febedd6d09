//! Error types for column binding and value decoding.

use thiserror::Error;

use crate::protocol::backend::Diagnostics;

/// Result type alias for cursor and decode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cursor, planning and decode operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The backend declared a column type this layer cannot decode.
    #[error("unsupported column type {sql_type}")]
    UnsupportedType { sql_type: i16 },

    /// Byte span inconsistent with the layout the decode type expects.
    #[error("malformed data: {message}")]
    MalformedData { message: String },

    /// The backend broke the retrieval contract (e.g. reported more data than
    /// the buffer it was handed).
    #[error("protocol violation: {message}")]
    ProtocolViolation { message: String },

    /// A backend call failed.
    #[error("{function}: {diagnostics}")]
    Fetch {
        function: &'static str,
        diagnostics: Diagnostics,
    },

    /// The operation was cancelled while `function` was in flight.
    #[error("{function}: operation cancelled")]
    Cancelled { function: &'static str },

    /// The cursor was closed or poisoned by an earlier cancellation.
    #[error("cursor is closed")]
    CursorClosed,

    /// `values` was called without a current row.
    #[error("no current row")]
    NoCurrentRow,

    /// Binding a fixed buffer failed. The cursor recovers by retrieving the
    /// column on demand.
    #[error("SQLBindCol failed for column {column}: {diagnostics}")]
    Bind {
        column: usize,
        diagnostics: Diagnostics,
    },

    /// Invalid connection configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Column index out of bounds.
    #[error("column index {index} out of bounds (columns: {count})")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    /// Operation the driver does not provide.
    #[error("{feature}: not implemented")]
    NotImplemented { feature: &'static str },
}

impl Error {
    /// Create a malformed data error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedData {
            message: message.into(),
        }
    }

    /// Create a protocol violation error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap backend diagnostics for a failed call.
    pub fn fetch(function: &'static str, diagnostics: Diagnostics) -> Self {
        Self::Fetch {
            function,
            diagnostics,
        }
    }

    /// True for failures of the underlying backend call path, including
    /// cancellation and use of a dead cursor.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::Fetch { .. } | Error::Cancelled { .. } | Error::CursorClosed
        )
    }

    /// True for decode-time failures that abort the current row.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedType { .. }
                | Error::MalformedData { .. }
                | Error::ProtocolViolation { .. }
        )
    }
}
