//! Column binding and value marshalling for ODBC-style result cursors
//!
//! Plans a retrieval strategy for every column of a result set (a buffer
//! filled on row fetch, or chunked on-demand retrieval), pulls raw bytes
//! from a row-oriented [`Backend`](protocol::Backend), and decodes them into
//! typed [`Value`]s with timezone-aware date/time handling.
//!
//! # Example
//!
//! ```
//! use odbc_fetch_rs::protocol::constants::{SQL_INTEGER, SQL_WLONGVARCHAR};
//! use odbc_fetch_rs::protocol::memory::{Cell, MemoryBackend, MemoryColumn, MemoryResultSet};
//! use odbc_fetch_rs::{Connection, Cursor, DriverConfig, Result};
//!
//! fn main() -> Result<()> {
//!     let conn = Connection::open("Driver=Memory;SSP_timezone=UTC;", DriverConfig::default())?;
//!     let backend = MemoryBackend::new().with_result_set(
//!         MemoryResultSet::new(vec![
//!             MemoryColumn::new("id", SQL_INTEGER, 10),
//!             MemoryColumn::new("note", SQL_WLONGVARCHAR, 0),
//!         ])
//!         .row(vec![Cell::long(1), Cell::wtext("hello")]),
//!     );
//!
//!     let mut cursor = conn.query(backend)?;
//!     for row in cursor.rows() {
//!         let row = row?;
//!         println!("{:?}", row.values());
//!     }
//!     cursor.close()?;
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod column;
pub mod connection;
pub mod cursor;
pub mod error;
pub mod protocol;

// Re-export main types
pub use cancel::CancelToken;
pub use column::{BoundColumn, ColumnPlan, StreamedColumn};
pub use connection::{Connection, DriverConfig, ExecResult};
pub use cursor::{Cursor, RowCursor, Rows};
pub use error::{Error, Result};
pub use protocol::connect::ConnectParams;
pub use protocol::types::{
    ColumnDescriptor, ColumnInfo, DecodeType, Nullability, Row, SqlType, Value, ValueKind,
};
