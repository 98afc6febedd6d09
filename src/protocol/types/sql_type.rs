//! Declared wire types as reported by the backend's column description.

use crate::error::{Error, Result};
use crate::protocol::constants::*;

/// Backend wire type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Numeric,
    Decimal,
    Float,
    Real,
    Double,
    TypeDate,
    TypeTime,
    TypeTimestamp,
    /// SQL Server `time(n)` with fractional seconds.
    SsTime2,
    Guid,
    Char,
    VarChar,
    LongVarChar,
    WChar,
    WVarChar,
    WLongVarChar,
    /// SQL Server `xml`, delivered as wide text.
    SsXml,
    Binary,
    VarBinary,
    LongVarBinary,
}

impl SqlType {
    /// Create from the raw type code.
    ///
    /// Returns `Err(Error::UnsupportedType)` for codes outside the table.
    pub fn from_raw(sql_type: i16) -> Result<Self> {
        let t = match sql_type {
            SQL_BIT => SqlType::Bit,
            SQL_TINYINT => SqlType::TinyInt,
            SQL_SMALLINT => SqlType::SmallInt,
            SQL_INTEGER => SqlType::Integer,
            SQL_BIGINT => SqlType::BigInt,
            SQL_NUMERIC => SqlType::Numeric,
            SQL_DECIMAL => SqlType::Decimal,
            SQL_FLOAT => SqlType::Float,
            SQL_REAL => SqlType::Real,
            SQL_DOUBLE => SqlType::Double,
            SQL_TYPE_DATE => SqlType::TypeDate,
            SQL_TYPE_TIME => SqlType::TypeTime,
            SQL_TYPE_TIMESTAMP => SqlType::TypeTimestamp,
            SQL_SS_TIME2 => SqlType::SsTime2,
            SQL_GUID => SqlType::Guid,
            SQL_CHAR => SqlType::Char,
            SQL_VARCHAR => SqlType::VarChar,
            SQL_LONGVARCHAR => SqlType::LongVarChar,
            SQL_WCHAR => SqlType::WChar,
            SQL_WVARCHAR => SqlType::WVarChar,
            SQL_WLONGVARCHAR => SqlType::WLongVarChar,
            SQL_SS_XML => SqlType::SsXml,
            SQL_BINARY => SqlType::Binary,
            SQL_VARBINARY => SqlType::VarBinary,
            SQL_LONGVARBINARY => SqlType::LongVarBinary,
            _ => return Err(Error::UnsupportedType { sql_type }),
        };
        Ok(t)
    }

    /// Get the raw type code.
    pub fn to_raw(self) -> i16 {
        match self {
            SqlType::Bit => SQL_BIT,
            SqlType::TinyInt => SQL_TINYINT,
            SqlType::SmallInt => SQL_SMALLINT,
            SqlType::Integer => SQL_INTEGER,
            SqlType::BigInt => SQL_BIGINT,
            SqlType::Numeric => SQL_NUMERIC,
            SqlType::Decimal => SQL_DECIMAL,
            SqlType::Float => SQL_FLOAT,
            SqlType::Real => SQL_REAL,
            SqlType::Double => SQL_DOUBLE,
            SqlType::TypeDate => SQL_TYPE_DATE,
            SqlType::TypeTime => SQL_TYPE_TIME,
            SqlType::TypeTimestamp => SQL_TYPE_TIMESTAMP,
            SqlType::SsTime2 => SQL_SS_TIME2,
            SqlType::Guid => SQL_GUID,
            SqlType::Char => SQL_CHAR,
            SqlType::VarChar => SQL_VARCHAR,
            SqlType::LongVarChar => SQL_LONGVARCHAR,
            SqlType::WChar => SQL_WCHAR,
            SqlType::WVarChar => SQL_WVARCHAR,
            SqlType::WLongVarChar => SQL_WLONGVARCHAR,
            SqlType::SsXml => SQL_SS_XML,
            SqlType::Binary => SQL_BINARY,
            SqlType::VarBinary => SQL_VARBINARY,
            SqlType::LongVarBinary => SQL_LONGVARBINARY,
        }
    }

    /// VARCHAR-class types whose reported size some backends get wrong.
    pub fn has_unreliable_size(self) -> bool {
        matches!(
            self,
            SqlType::VarChar | SqlType::WVarChar | SqlType::VarBinary
        )
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SqlType::Bit => "SQL_BIT",
            SqlType::TinyInt => "SQL_TINYINT",
            SqlType::SmallInt => "SQL_SMALLINT",
            SqlType::Integer => "SQL_INTEGER",
            SqlType::BigInt => "SQL_BIGINT",
            SqlType::Numeric => "SQL_NUMERIC",
            SqlType::Decimal => "SQL_DECIMAL",
            SqlType::Float => "SQL_FLOAT",
            SqlType::Real => "SQL_REAL",
            SqlType::Double => "SQL_DOUBLE",
            SqlType::TypeDate => "SQL_TYPE_DATE",
            SqlType::TypeTime => "SQL_TYPE_TIME",
            SqlType::TypeTimestamp => "SQL_TYPE_TIMESTAMP",
            SqlType::SsTime2 => "SQL_SS_TIME2",
            SqlType::Guid => "SQL_GUID",
            SqlType::Char => "SQL_CHAR",
            SqlType::VarChar => "SQL_VARCHAR",
            SqlType::LongVarChar => "SQL_LONGVARCHAR",
            SqlType::WChar => "SQL_WCHAR",
            SqlType::WVarChar => "SQL_WVARCHAR",
            SqlType::WLongVarChar => "SQL_WLONGVARCHAR",
            SqlType::SsXml => "SQL_SS_XML",
            SqlType::Binary => "SQL_BINARY",
            SqlType::VarBinary => "SQL_VARBINARY",
            SqlType::LongVarBinary => "SQL_LONGVARBINARY",
        };
        f.write_str(name)
    }
}
