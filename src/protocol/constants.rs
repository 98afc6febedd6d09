//! Backend protocol constants.
//!
//! Values follow the ODBC `sql.h`/`sqlext.h` headers plus the SQL Server
//! extensions the column planner understands.

// SQL (wire) data types reported by SQLDescribeCol
pub const SQL_UNKNOWN_TYPE: i16 = 0;
pub const SQL_CHAR: i16 = 1;
pub const SQL_NUMERIC: i16 = 2;
pub const SQL_DECIMAL: i16 = 3;
pub const SQL_INTEGER: i16 = 4;
pub const SQL_SMALLINT: i16 = 5;
pub const SQL_FLOAT: i16 = 6;
pub const SQL_REAL: i16 = 7;
pub const SQL_DOUBLE: i16 = 8;
pub const SQL_VARCHAR: i16 = 12;
pub const SQL_TYPE_DATE: i16 = 91;
pub const SQL_TYPE_TIME: i16 = 92;
pub const SQL_TYPE_TIMESTAMP: i16 = 93;
pub const SQL_LONGVARCHAR: i16 = -1;
pub const SQL_BINARY: i16 = -2;
pub const SQL_VARBINARY: i16 = -3;
pub const SQL_LONGVARBINARY: i16 = -4;
pub const SQL_BIGINT: i16 = -5;
pub const SQL_TINYINT: i16 = -6;
pub const SQL_BIT: i16 = -7;
pub const SQL_WCHAR: i16 = -8;
pub const SQL_WVARCHAR: i16 = -9;
pub const SQL_WLONGVARCHAR: i16 = -10;
pub const SQL_GUID: i16 = -11;
pub const SQL_SS_XML: i16 = -152;
pub const SQL_SS_TIME2: i16 = -154;

// C (decode) data types passed to SQLBindCol/SQLGetData
pub const SQL_C_CHAR: i16 = SQL_CHAR;
pub const SQL_C_LONG: i16 = SQL_INTEGER;
pub const SQL_C_DOUBLE: i16 = SQL_DOUBLE;
pub const SQL_C_DATE: i16 = SQL_TYPE_DATE;
pub const SQL_C_TIME: i16 = SQL_TYPE_TIME;
pub const SQL_C_TYPE_TIMESTAMP: i16 = SQL_TYPE_TIMESTAMP;
pub const SQL_C_BINARY: i16 = SQL_BINARY;
pub const SQL_C_BIT: i16 = SQL_BIT;
pub const SQL_C_WCHAR: i16 = SQL_WCHAR;
pub const SQL_C_SBIGINT: i16 = SQL_BIGINT - 20;
pub const SQL_C_GUID: i16 = SQL_GUID;

// Length/indicator sentinels
pub const SQL_NULL_DATA: isize = -1;
pub const SQL_NO_TOTAL: isize = -4;

// Nullability reported by SQLDescribeCol
pub const SQL_NO_NULLS: i16 = 0;
pub const SQL_NULLABLE: i16 = 1;
pub const SQL_NULLABLE_UNKNOWN: i16 = 2;

// SQLSTATE for "string data, right truncated"
pub const SQLSTATE_DATA_TRUNCATED: &str = "01004";

/// Largest declared width (in characters or bytes) that is still bound to a
/// fixed buffer. Wider or unsized columns are streamed.
pub const MAX_BOUND_WIDTH: u64 = 1024;

/// Initial buffer size for each on-demand retrieval round.
pub const STREAM_CHUNK_SIZE: usize = 1024;

/// Smallest buffer allocated for a bound column.
pub const MIN_BOUND_BUFFER: usize = 8;

/// Initial column name buffer, in UTF-16 code units.
pub const COLUMN_NAME_BUFFER: usize = 150;

/// Terminator headroom added when sizing from a total-length hint; fits the
/// widest (wide character) terminator.
pub const TERMINATOR_HEADROOM: usize = 2;
