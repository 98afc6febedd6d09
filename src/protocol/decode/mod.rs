//! Value decoders for fetched column bytes.
//!
//! Each decode type has a bounds-checked decode function; [`decode_value`]
//! dispatches on the tag.
//!
//! | Decode type | Module | Value |
//! |-------------|--------|-------|
//! | BIT, LONG, SBIGINT, DOUBLE | `number` | `Bool`, `I32`, `I64`, `F64` |
//! | CHAR | `text` | `Text`, or `Bytes` when not UTF-8 |
//! | WCHAR | `text` | `Text` |
//! | TIMESTAMP, DATE, TIME, TIME2 | `date` | `Timestamp` |
//! | GUID | `guid` | `Guid` |
//!
//! Binary data needs no decoder and is copied out as `Bytes`.

mod date;
mod guid;
mod number;
mod text;

pub use date::{DateStruct, Time2Struct, TimeStruct, TimestampStruct};
pub use guid::GuidStruct;
pub use number::{decode_bit, decode_double, decode_long, decode_sbigint};
pub use text::{decode_char, decode_wchar, encode_wchar};

use bytes::Bytes;
use chrono_tz::Tz;

use crate::error::Result;
use crate::protocol::types::{DecodeType, Value};

/// Zones consulted when decoding date/time values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimezoneContext {
    /// Override for the column (from the connection string).
    pub column: Option<Tz>,
    /// Process-wide default.
    pub default: Option<Tz>,
}

impl TimezoneContext {
    pub fn new(column: Option<Tz>, default: Option<Tz>) -> Self {
        Self { column, default }
    }

    /// Column override, else process default, else UTC.
    pub fn resolve(&self) -> Tz {
        self.column.or(self.default).unwrap_or(Tz::UTC)
    }
}

/// Decode a non-null column value.
pub fn decode_value(decode_type: DecodeType, bytes: &[u8], tz: &TimezoneContext) -> Result<Value> {
    let value = match decode_type {
        DecodeType::Bit => Value::Bool(decode_bit(bytes)?),
        DecodeType::Long => Value::I32(decode_long(bytes)?),
        DecodeType::SBigInt => Value::I64(decode_sbigint(bytes)?),
        DecodeType::Double => Value::F64(decode_double(bytes)?),
        DecodeType::Char => decode_char(bytes),
        DecodeType::WChar => Value::Text(decode_wchar(bytes)?),
        DecodeType::Binary => Value::Bytes(Bytes::copy_from_slice(bytes)),
        DecodeType::Timestamp => {
            Value::Timestamp(TimestampStruct::decode(bytes)?.to_datetime(tz.resolve())?)
        }
        DecodeType::Date => Value::Timestamp(DateStruct::decode(bytes)?.to_datetime(tz.resolve())?),
        DecodeType::Time => Value::Timestamp(TimeStruct::decode(bytes)?.to_datetime(tz.resolve())?),
        DecodeType::Time2 => {
            Value::Timestamp(Time2Struct::decode(bytes)?.to_datetime(tz.resolve())?)
        }
        DecodeType::Guid => Value::Guid(GuidStruct::decode(bytes)?.to_string()),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timezone_resolution_order() {
        let ny = chrono_tz::America::New_York;
        let tokyo = chrono_tz::Asia::Tokyo;
        assert_eq!(TimezoneContext::default().resolve(), Tz::UTC);
        assert_eq!(TimezoneContext::new(None, Some(tokyo)).resolve(), tokyo);
        assert_eq!(TimezoneContext::new(Some(ny), Some(tokyo)).resolve(), ny);
        assert_eq!(TimezoneContext::new(Some(ny), None).resolve(), ny);
    }

    #[test]
    fn test_decode_scalars() {
        let tz = TimezoneContext::default();
        assert_eq!(
            decode_value(DecodeType::Bit, &[1], &tz).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            decode_value(DecodeType::Long, &7i32.to_ne_bytes(), &tz).unwrap(),
            Value::I32(7)
        );
        assert_eq!(
            decode_value(DecodeType::SBigInt, &(-9i64).to_ne_bytes(), &tz).unwrap(),
            Value::I64(-9)
        );
        assert_eq!(
            decode_value(DecodeType::Double, &2.25f64.to_ne_bytes(), &tz).unwrap(),
            Value::F64(2.25)
        );
        assert_eq!(
            decode_value(DecodeType::Binary, &[0, 1, 2], &tz).unwrap(),
            Value::Bytes(Bytes::from_static(&[0, 1, 2]))
        );
    }

    #[test]
    fn test_decode_timestamp_uses_column_zone() {
        let berlin = chrono_tz::Europe::Berlin;
        let tz = TimezoneContext::new(Some(berlin), Some(chrono_tz::Asia::Tokyo));
        let raw = TimestampStruct {
            year: 2023,
            month: 1,
            day: 2,
            hour: 3,
            minute: 4,
            second: 5,
            fraction: 6,
        };
        let value = decode_value(DecodeType::Timestamp, &raw.to_bytes(), &tz).unwrap();
        let expected = berlin
            .with_ymd_and_hms(2023, 1, 2, 3, 4, 5)
            .unwrap()
            + chrono::Duration::nanoseconds(6);
        assert_eq!(value, Value::Timestamp(expected));
    }

    #[test]
    fn test_decode_guid() {
        let raw = GuidStruct {
            data1: 0x01020304,
            data2: 0x0506,
            data3: 0x0708,
            data4: [0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10],
        };
        let value = decode_value(DecodeType::Guid, &raw.to_bytes(), &TimezoneContext::default())
            .unwrap();
        assert_eq!(
            value,
            Value::Guid("01020304-0506-0708-090a-0b0c0d0e0f10".to_string())
        );
    }
}
