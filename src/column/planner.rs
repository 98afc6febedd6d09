//! Choose a retrieval strategy and decode type for each result column.

use chrono_tz::Tz;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::backend::Backend;
use crate::protocol::constants::{COLUMN_NAME_BUFFER, MAX_BOUND_WIDTH};
use crate::protocol::types::{ColumnDescriptor, DecodeType, Nullability, SqlType};

use super::{BoundColumn, ColumnPlan, StreamedColumn};

/// Column metadata as reported by the backend, before planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: String,
    pub sql_type: i16,
    pub column_size: u64,
    pub nullable: i16,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, sql_type: i16, column_size: u64, nullable: i16) -> Self {
        Self {
            name: name.into(),
            sql_type,
            column_size,
            nullable,
        }
    }
}

/// Inputs to planning that come from configuration rather than metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Zone override recorded on date/time columns.
    pub timezone: Option<Tz>,
    /// Trust the declared size of VARCHAR, WVARCHAR and VARBINARY columns
    /// instead of always streaming them.
    pub trust_varchar_size: bool,
}

/// Fetch the metadata of one column, retrying once with a larger name
/// buffer when the first one was too small.
pub fn describe_column<B: Backend>(backend: &mut B, column: usize) -> Result<RawColumn> {
    let mut name = vec![0u16; COLUMN_NAME_BUFFER];
    let mut desc = backend
        .describe_column(column, &mut name)
        .map_err(|d| Error::fetch("SQLDescribeCol", d))?;

    if desc.with_info && desc.name_len > name.len() {
        name = vec![0u16; desc.name_len];
        desc = backend
            .describe_column(column, &mut name)
            .map_err(|d| Error::fetch("SQLDescribeCol", d))?;
        if desc.name_len > name.len() {
            return Err(Error::protocol(format!(
                "failed to allocate column name buffer for column #{}",
                column + 1
            )));
        }
    }

    let len = desc.name_len.min(name.len());
    Ok(RawColumn {
        name: String::from_utf16_lossy(&name[..len]),
        sql_type: desc.sql_type,
        column_size: desc.column_size,
        nullable: desc.nullable,
    })
}

/// Map column metadata to its descriptor and retrieval plan.
///
/// Declared widths of 0 or above 1024 are streamed. VARCHAR, WVARCHAR and
/// VARBINARY are streamed regardless of width unless
/// [`PlanOptions::trust_varchar_size`] is set, since some backends declare
/// sizes smaller than the values they return.
pub fn plan_column(
    column: usize,
    raw: &RawColumn,
    options: &PlanOptions,
) -> Result<(ColumnDescriptor, ColumnPlan)> {
    let sql_type = SqlType::from_raw(raw.sql_type)?;
    let width = raw.column_size;

    let (decode_type, plan) = match sql_type {
        SqlType::Bit => fixed(DecodeType::Bit),
        SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer => fixed(DecodeType::Long),
        SqlType::BigInt => fixed(DecodeType::SBigInt),
        SqlType::Numeric | SqlType::Decimal | SqlType::Float | SqlType::Real | SqlType::Double => {
            fixed(DecodeType::Double)
        }
        SqlType::TypeTimestamp => fixed(DecodeType::Timestamp),
        SqlType::TypeDate => fixed(DecodeType::Date),
        SqlType::TypeTime => fixed(DecodeType::Time),
        SqlType::SsTime2 => fixed(DecodeType::Time2),
        SqlType::Guid => fixed(DecodeType::Guid),
        _ if sql_type.has_unreliable_size() && !options.trust_varchar_size => {
            streamed(text_or_binary(sql_type))
        }
        SqlType::Char | SqlType::VarChar => variable(DecodeType::Char, width),
        SqlType::WChar | SqlType::WVarChar => variable(DecodeType::WChar, width),
        SqlType::Binary | SqlType::VarBinary => variable(DecodeType::Binary, width),
        SqlType::LongVarChar => streamed(DecodeType::Char),
        SqlType::WLongVarChar | SqlType::SsXml => streamed(DecodeType::WChar),
        SqlType::LongVarBinary => streamed(DecodeType::Binary),
    };

    let timezone = match decode_type {
        DecodeType::Timestamp | DecodeType::Date | DecodeType::Time | DecodeType::Time2 => {
            options.timezone
        }
        _ => None,
    };

    debug!(
        column,
        name = %raw.name,
        sql_type = %sql_type,
        c_type = decode_type.label(),
        bound = plan.is_bound_plan(),
        "Planned column"
    );

    let descriptor = ColumnDescriptor {
        name: raw.name.clone(),
        sql_type,
        column_size: raw.column_size,
        nullability: Nullability::from_raw(raw.nullable),
        decode_type,
        timezone,
    };
    Ok((descriptor, plan))
}

fn text_or_binary(sql_type: SqlType) -> DecodeType {
    match sql_type {
        SqlType::WVarChar => DecodeType::WChar,
        SqlType::VarBinary => DecodeType::Binary,
        _ => DecodeType::Char,
    }
}

fn fixed(decode_type: DecodeType) -> (DecodeType, ColumnPlan) {
    let width = decode_type.fixed_width().unwrap_or_default();
    (
        decode_type,
        ColumnPlan::Bound(BoundColumn::fixed(decode_type, width)),
    )
}

fn variable(decode_type: DecodeType, width: u64) -> (DecodeType, ColumnPlan) {
    if width == 0 || width > MAX_BOUND_WIDTH {
        return streamed(decode_type);
    }
    (
        decode_type,
        ColumnPlan::Bound(BoundColumn::variable(decode_type, width as usize)),
    )
}

fn streamed(decode_type: DecodeType) -> (DecodeType, ColumnPlan) {
    (
        decode_type,
        ColumnPlan::Streamed(StreamedColumn::new(decode_type)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::*;

    fn plan_of(sql_type: i16, size: u64) -> (ColumnDescriptor, ColumnPlan) {
        plan_column(0, &RawColumn::new("c", sql_type, size, SQL_NULLABLE), &PlanOptions::default())
            .unwrap()
    }

    #[test]
    fn test_fixed_width_types() {
        let cases = [
            (SQL_BIT, DecodeType::Bit),
            (SQL_TINYINT, DecodeType::Long),
            (SQL_SMALLINT, DecodeType::Long),
            (SQL_INTEGER, DecodeType::Long),
            (SQL_BIGINT, DecodeType::SBigInt),
            (SQL_NUMERIC, DecodeType::Double),
            (SQL_DECIMAL, DecodeType::Double),
            (SQL_FLOAT, DecodeType::Double),
            (SQL_REAL, DecodeType::Double),
            (SQL_DOUBLE, DecodeType::Double),
            (SQL_TYPE_TIMESTAMP, DecodeType::Timestamp),
            (SQL_TYPE_DATE, DecodeType::Date),
            (SQL_TYPE_TIME, DecodeType::Time),
            (SQL_SS_TIME2, DecodeType::Time2),
            (SQL_GUID, DecodeType::Guid),
        ];
        for (sql_type, expected) in cases {
            let (desc, plan) = plan_of(sql_type, 0);
            assert_eq!(desc.decode_type, expected, "sql type {}", sql_type);
            assert!(plan.is_bound_plan(), "sql type {}", sql_type);
        }
    }

    #[test]
    fn test_width_threshold() {
        assert!(plan_of(SQL_CHAR, 1024).1.is_bound_plan());
        assert!(!plan_of(SQL_CHAR, 1025).1.is_bound_plan());
        assert!(!plan_of(SQL_CHAR, 0).1.is_bound_plan());
        assert!(plan_of(SQL_WCHAR, 10).1.is_bound_plan());
        assert!(plan_of(SQL_BINARY, 16).1.is_bound_plan());
        assert!(!plan_of(SQL_BINARY, 4096).1.is_bound_plan());
    }

    #[test]
    fn test_varchar_always_streamed() {
        for sql_type in [SQL_VARCHAR, SQL_WVARCHAR, SQL_VARBINARY] {
            let (_, plan) = plan_of(sql_type, 10);
            assert!(!plan.is_bound_plan());
        }
        let (desc, _) = plan_of(SQL_VARCHAR, 10);
        assert_eq!(desc.decode_type, DecodeType::Char);
        let (desc, _) = plan_of(SQL_WVARCHAR, 10);
        assert_eq!(desc.decode_type, DecodeType::WChar);
        let (desc, _) = plan_of(SQL_VARBINARY, 10);
        assert_eq!(desc.decode_type, DecodeType::Binary);
    }

    #[test]
    fn test_trusted_varchar_size() {
        let options = PlanOptions {
            trust_varchar_size: true,
            ..Default::default()
        };
        let raw = RawColumn::new("v", SQL_VARCHAR, 10, SQL_NULLABLE);
        let (_, plan) = plan_column(0, &raw, &options).unwrap();
        assert!(plan.is_bound_plan());
        let raw = RawColumn::new("v", SQL_VARCHAR, 5000, SQL_NULLABLE);
        let (_, plan) = plan_column(0, &raw, &options).unwrap();
        assert!(!plan.is_bound_plan());
    }

    #[test]
    fn test_long_types_streamed() {
        let (desc, plan) = plan_of(SQL_LONGVARCHAR, 10);
        assert_eq!(desc.decode_type, DecodeType::Char);
        assert!(!plan.is_bound_plan());
        let (desc, plan) = plan_of(SQL_WLONGVARCHAR, 10);
        assert_eq!(desc.decode_type, DecodeType::WChar);
        assert!(!plan.is_bound_plan());
        let (desc, plan) = plan_of(SQL_SS_XML, 0);
        assert_eq!(desc.decode_type, DecodeType::WChar);
        assert!(!plan.is_bound_plan());
        let (desc, plan) = plan_of(SQL_LONGVARBINARY, 10);
        assert_eq!(desc.decode_type, DecodeType::Binary);
        assert!(!plan.is_bound_plan());
    }

    #[test]
    fn test_unsupported_type() {
        let raw = RawColumn::new("x", SQL_UNKNOWN_TYPE, 0, SQL_NULLABLE);
        assert!(matches!(
            plan_column(0, &raw, &PlanOptions::default()),
            Err(Error::UnsupportedType { sql_type: 0 })
        ));
    }

    #[test]
    fn test_timezone_only_on_datetime_columns() {
        let options = PlanOptions {
            timezone: Some(chrono_tz::America::New_York),
            ..Default::default()
        };
        let raw = RawColumn::new("ts", SQL_TYPE_TIMESTAMP, 0, SQL_NO_NULLS);
        let (desc, _) = plan_column(0, &raw, &options).unwrap();
        assert_eq!(desc.timezone, Some(chrono_tz::America::New_York));
        assert_eq!(desc.nullable(), Some(false));
        let raw = RawColumn::new("n", SQL_INTEGER, 0, SQL_NULLABLE_UNKNOWN);
        let (desc, _) = plan_column(0, &raw, &options).unwrap();
        assert_eq!(desc.timezone, None);
        assert_eq!(desc.nullable(), None);
    }
}
