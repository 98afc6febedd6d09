//! Decode types: the C representation a column is retrieved in.

use crate::protocol::constants::*;

/// Canonical decode tag understood by the value decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeType {
    /// Single byte, non-zero means true.
    Bit,
    /// 32-bit signed integer.
    Long,
    /// 64-bit signed integer.
    SBigInt,
    Double,
    /// Single-byte text, NUL terminated by the backend.
    Char,
    /// UTF-16 text, NUL terminated by the backend.
    WChar,
    Binary,
    Timestamp,
    Date,
    Time,
    /// Time of day with fractional seconds. Retrieved as raw binary.
    Time2,
    Guid,
}

/// Kind of value a column yields once decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    I32,
    I64,
    F64,
    Text,
    Bytes,
    Timestamp,
    Guid,
}

impl DecodeType {
    /// Type code passed to `bind_column`/`get_data`.
    pub fn c_type(self) -> i16 {
        match self {
            DecodeType::Bit => SQL_C_BIT,
            DecodeType::Long => SQL_C_LONG,
            DecodeType::SBigInt => SQL_C_SBIGINT,
            DecodeType::Double => SQL_C_DOUBLE,
            DecodeType::Char => SQL_C_CHAR,
            DecodeType::WChar => SQL_C_WCHAR,
            DecodeType::Binary | DecodeType::Time2 => SQL_C_BINARY,
            DecodeType::Timestamp => SQL_C_TYPE_TIMESTAMP,
            DecodeType::Date => SQL_C_DATE,
            DecodeType::Time => SQL_C_TIME,
            DecodeType::Guid => SQL_C_GUID,
        }
    }

    /// Exact byte width for fixed layouts, `None` for variable-width types.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            DecodeType::Bit => Some(1),
            DecodeType::Long => Some(4),
            DecodeType::SBigInt | DecodeType::Double => Some(8),
            DecodeType::Timestamp => Some(16),
            DecodeType::Date | DecodeType::Time => Some(6),
            DecodeType::Time2 => Some(12),
            DecodeType::Guid => Some(16),
            DecodeType::Char | DecodeType::WChar | DecodeType::Binary => None,
        }
    }

    pub fn is_variable_width(self) -> bool {
        self.fixed_width().is_none()
    }

    /// Bytes the backend appends as terminator when it fills a buffer.
    pub fn terminator_len(self) -> usize {
        match self {
            DecodeType::Char => 1,
            DecodeType::WChar => 2,
            _ => 0,
        }
    }

    /// Bound buffer size for a variable-width column of `width` units.
    pub fn bounded_buffer_len(self, width: usize) -> usize {
        match self {
            DecodeType::Char => width + 1,
            DecodeType::WChar => (width + 1) * 2,
            _ => width,
        }
    }

    /// Label of the backend C type, e.g. `SQL_C_WCHAR`.
    pub fn label(self) -> &'static str {
        match self {
            DecodeType::Bit => "SQL_C_BIT",
            DecodeType::Long => "SQL_C_LONG",
            DecodeType::SBigInt => "SQL_C_SBIGINT",
            DecodeType::Double => "SQL_C_DOUBLE",
            DecodeType::Char => "SQL_C_CHAR",
            DecodeType::WChar => "SQL_C_WCHAR",
            DecodeType::Binary | DecodeType::Time2 => "SQL_C_BINARY",
            DecodeType::Timestamp => "SQL_C_TYPE_TIMESTAMP",
            DecodeType::Date => "SQL_C_DATE",
            DecodeType::Time => "SQL_C_TIME",
            DecodeType::Guid => "SQL_C_GUID",
        }
    }

    pub fn value_kind(self) -> ValueKind {
        match self {
            DecodeType::Bit => ValueKind::Bool,
            DecodeType::Long => ValueKind::I32,
            DecodeType::SBigInt => ValueKind::I64,
            DecodeType::Double => ValueKind::F64,
            DecodeType::Char | DecodeType::WChar => ValueKind::Text,
            DecodeType::Binary => ValueKind::Bytes,
            DecodeType::Timestamp | DecodeType::Date | DecodeType::Time | DecodeType::Time2 => {
                ValueKind::Timestamp
            }
            DecodeType::Guid => ValueKind::Guid,
        }
    }
}

impl std::fmt::Display for DecodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
