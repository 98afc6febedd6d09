//! Interface consumed from the external row-oriented backend.
//!
//! The backend owns the statement handle and its open result set. Every call
//! is synchronous and blocks the calling thread. Failed calls return the
//! diagnostic records the backend collected; the cursor attaches the name of
//! the failing call before surfacing them.

use std::fmt;

use crate::error::{Error, Result};
use crate::protocol::constants::{SQL_NO_TOTAL, SQL_NULL_DATA, SQLSTATE_DATA_TRUNCATED};

/// One backend diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagRecord {
    /// Five character SQLSTATE.
    pub state: String,
    /// Backend specific error code.
    pub native: i32,
    /// Message text.
    pub message: String,
}

impl DiagRecord {
    pub fn new(state: impl Into<String>, native: i32, message: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            native,
            message: message.into(),
        }
    }
}

impl fmt::Display for DiagRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.state, self.native, self.message)
    }
}

/// Diagnostic records attached to a failed or informational call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(pub Vec<DiagRecord>);

impl Diagnostics {
    /// Diagnostics without any record.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn records(&self) -> &[DiagRecord] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// SQLSTATE of the first record, if any.
    pub fn first_state(&self) -> Option<&str> {
        self.0.first().map(|r| r.state.as_str())
    }

    /// True when the records only describe right truncation of string data.
    pub fn is_truncation(&self) -> bool {
        match self.first_state() {
            None => true,
            Some(state) => state == SQLSTATE_DATA_TRUNCATED,
        }
    }
}

impl From<DiagRecord> for Diagnostics {
    fn from(record: DiagRecord) -> Self {
        Self(vec![record])
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no diagnostics available");
        }
        for (i, record) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

/// Result type for raw backend calls.
pub type BackendResult<T> = std::result::Result<T, Diagnostics>;

/// Decoded length/null indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Column value is NULL for the current row.
    Null,
    /// Remaining length cannot be predicted. Only produced by `get_data`.
    NoTotal,
    /// Number of bytes available (excluding any terminator).
    Length(usize),
}

impl Indicator {
    /// Interpret a raw signed indicator.
    pub fn from_raw(raw: isize) -> Result<Self> {
        match raw {
            SQL_NULL_DATA => Ok(Indicator::Null),
            SQL_NO_TOTAL => Ok(Indicator::NoTotal),
            n if n >= 0 => Ok(Indicator::Length(n as usize)),
            n => Err(Error::protocol(format!("invalid length indicator {}", n))),
        }
    }

    /// The raw signed representation.
    pub fn to_raw(self) -> isize {
        match self {
            Indicator::Null => SQL_NULL_DATA,
            Indicator::NoTotal => SQL_NO_TOTAL,
            Indicator::Length(n) => n as isize,
        }
    }

    pub fn is_null(self) -> bool {
        self == Indicator::Null
    }
}

/// Outcome of a successful `get_data` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataStatus {
    /// All remaining bytes fit in the buffer.
    Complete,
    /// Success with information. With SQLSTATE 01004 (or no record) the
    /// buffer was filled and more data remains.
    WithInfo(Diagnostics),
}

/// Response to a `get_data` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDataResponse {
    /// Raw length/null indicator.
    pub indicator: isize,
    pub status: DataStatus,
}

/// Raw column metadata as returned by `describe_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    /// Full name length in UTF-16 code units, which may exceed the buffer.
    pub name_len: usize,
    /// Declared wire type.
    pub sql_type: i16,
    /// Declared column size (characters or bytes, 0 when unknown).
    pub column_size: u64,
    pub decimal_digits: i16,
    /// Raw nullability (`SQL_NO_NULLS`, `SQL_NULLABLE`, `SQL_NULLABLE_UNKNOWN`).
    pub nullable: i16,
    /// True when the backend reported success with information.
    pub with_info: bool,
}

/// A bound column buffer handed to the backend on every row fetch.
pub struct BindTarget<'a> {
    /// Zero-based column index.
    pub column: usize,
    /// Decode type code the column was bound with.
    pub c_type: i16,
    pub buffer: &'a mut [u8],
    pub indicator: &'a mut isize,
}

/// Statement-level backend operations used by the cursor.
///
/// Column indices are zero-based. Implementations backed by a C driver
/// translate them to the one-based numbering of the native API.
pub trait Backend {
    /// Number of columns in the current result set.
    fn num_result_cols(&mut self) -> BackendResult<usize>;

    /// Describe one column, writing as much of its name as fits into `name`.
    fn describe_column(&mut self, column: usize, name: &mut [u16])
        -> BackendResult<ColumnDescription>;

    /// Register a fixed buffer of `capacity` bytes for `column`. After a
    /// successful bind, `fetch` fills the buffer through a [`BindTarget`].
    fn bind_column(&mut self, column: usize, c_type: i16, capacity: usize) -> BackendResult<()>;

    /// Advance to the next row, filling every bound target. Returns `false`
    /// when no more rows exist.
    fn fetch(&mut self, targets: &mut [BindTarget<'_>]) -> BackendResult<bool>;

    /// Retrieve (part of) a column value of the current row into `buffer`.
    fn get_data(&mut self, column: usize, c_type: i16, buffer: &mut [u8])
        -> BackendResult<GetDataResponse>;

    /// Move to the next result set. Returns `false` when none remain.
    fn more_results(&mut self) -> BackendResult<bool>;

    /// Rows affected by a non-query statement.
    fn row_count(&mut self) -> BackendResult<i64>;

    /// Close the open cursor, discarding pending results.
    fn close_cursor(&mut self) -> BackendResult<()>;

    /// Cancel the statement currently executing.
    fn cancel(&mut self) -> BackendResult<()>;
}
