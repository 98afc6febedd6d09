//! Fixed date/time structure decoders.
//!
//! Layouts (native byte order, C struct alignment):
//! - TIMESTAMP (16 bytes): year i16, month u16, day u16, hour u16,
//!   minute u16, second u16, fraction u32 (nanoseconds)
//! - DATE (6 bytes): year i16, month u16, day u16
//! - TIME (6 bytes): hour u16, minute u16, second u16
//! - TIME2 (12 bytes): hour u16, minute u16, second u16, 2 padding bytes,
//!   fraction u32 (nanoseconds)

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::protocol::buffer::{ReadBuffer, WriteBuffer};

/// Timestamp structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampStruct {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    /// Fractional seconds in nanoseconds.
    pub fraction: u32,
}

impl TimestampStruct {
    pub const SIZE: usize = 16;

    /// Decode from exactly 16 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        expect_len("TIMESTAMP", data, Self::SIZE)?;
        let mut buf = ReadBuffer::new(data);
        Ok(Self {
            year: buf.read_i16_ne()?,
            month: buf.read_u16_ne()?,
            day: buf.read_u16_ne()?,
            hour: buf.read_u16_ne()?,
            minute: buf.read_u16_ne()?,
            second: buf.read_u16_ne()?,
            fraction: buf.read_u32_ne()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = WriteBuffer::with_capacity(Self::SIZE);
        buf.write_i16_ne(self.year);
        buf.write_u16_ne(self.month);
        buf.write_u16_ne(self.day);
        buf.write_u16_ne(self.hour);
        buf.write_u16_ne(self.minute);
        buf.write_u16_ne(self.second);
        buf.write_u32_ne(self.fraction);
        buf.freeze().to_vec()
    }

    pub fn to_datetime(&self, tz: Tz) -> Result<DateTime<Tz>> {
        let date = make_date(self.year as i32, self.month, self.day)?;
        let time = make_time(self.hour, self.minute, self.second, self.fraction)?;
        localize(tz, NaiveDateTime::new(date, time))
    }
}

/// Date structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateStruct {
    pub year: i16,
    pub month: u16,
    pub day: u16,
}

impl DateStruct {
    pub const SIZE: usize = 6;

    /// Decode from exactly 6 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        expect_len("DATE", data, Self::SIZE)?;
        let mut buf = ReadBuffer::new(data);
        Ok(Self {
            year: buf.read_i16_ne()?,
            month: buf.read_u16_ne()?,
            day: buf.read_u16_ne()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = WriteBuffer::with_capacity(Self::SIZE);
        buf.write_i16_ne(self.year);
        buf.write_u16_ne(self.month);
        buf.write_u16_ne(self.day);
        buf.freeze().to_vec()
    }

    /// Midnight of this date in `tz`.
    pub fn to_datetime(&self, tz: Tz) -> Result<DateTime<Tz>> {
        let date = make_date(self.year as i32, self.month, self.day)?;
        localize(tz, NaiveDateTime::new(date, NaiveTime::MIN))
    }
}

/// Time-of-day structure (whole seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeStruct {
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl TimeStruct {
    pub const SIZE: usize = 6;

    /// Decode from exactly 6 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        expect_len("TIME", data, Self::SIZE)?;
        let mut buf = ReadBuffer::new(data);
        Ok(Self {
            hour: buf.read_u16_ne()?,
            minute: buf.read_u16_ne()?,
            second: buf.read_u16_ne()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = WriteBuffer::with_capacity(Self::SIZE);
        buf.write_u16_ne(self.hour);
        buf.write_u16_ne(self.minute);
        buf.write_u16_ne(self.second);
        buf.freeze().to_vec()
    }

    /// This time of day on 0001-01-01 in `tz`.
    pub fn to_datetime(&self, tz: Tz) -> Result<DateTime<Tz>> {
        let time = make_time(self.hour, self.minute, self.second, 0)?;
        localize(tz, NaiveDateTime::new(zero_date()?, time))
    }
}

/// Time-of-day structure with fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Time2Struct {
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    /// Fractional seconds in nanoseconds.
    pub fraction: u32,
}

impl Time2Struct {
    pub const SIZE: usize = 12;

    /// Decode from exactly 12 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        expect_len("TIME2", data, Self::SIZE)?;
        let mut buf = ReadBuffer::new(data);
        let hour = buf.read_u16_ne()?;
        let minute = buf.read_u16_ne()?;
        let second = buf.read_u16_ne()?;
        buf.skip(2)?;
        let fraction = buf.read_u32_ne()?;
        Ok(Self {
            hour,
            minute,
            second,
            fraction,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = WriteBuffer::with_capacity(Self::SIZE);
        buf.write_u16_ne(self.hour);
        buf.write_u16_ne(self.minute);
        buf.write_u16_ne(self.second);
        buf.write_zeros(2);
        buf.write_u32_ne(self.fraction);
        buf.freeze().to_vec()
    }

    /// This time of day on 0001-01-01 in `tz`.
    pub fn to_datetime(&self, tz: Tz) -> Result<DateTime<Tz>> {
        let time = make_time(self.hour, self.minute, self.second, self.fraction)?;
        localize(tz, NaiveDateTime::new(zero_date()?, time))
    }
}

fn expect_len(what: &str, data: &[u8], size: usize) -> Result<()> {
    if data.len() != size {
        return Err(Error::malformed(format!(
            "{} value must be exactly {} bytes, got {}",
            what,
            size,
            data.len()
        )));
    }
    Ok(())
}

fn zero_date() -> Result<NaiveDate> {
    make_date(1, 1, 1)
}

fn make_date(year: i32, month: u16, day: u16) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(|| {
        Error::malformed(format!(
            "invalid date: year={}, month={}, day={}",
            year, month, day
        ))
    })
}

fn make_time(hour: u16, minute: u16, second: u16, nanos: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_nano_opt(hour as u32, minute as u32, second as u32, nanos).ok_or_else(
        || {
            Error::malformed(format!(
                "invalid time: hour={}, minute={}, second={}, fraction={}",
                hour, minute, second, nanos
            ))
        },
    )
}

/// Attach `tz` to a wall-clock time. Ambiguous times resolve to the earlier
/// instant; times inside a DST gap do not exist and are rejected.
fn localize(tz: Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Ok(t),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(Error::malformed(format!(
            "local time {} does not exist in {}",
            naive,
            tz.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_decode_timestamp() {
        let ts = TimestampStruct {
            year: 2024,
            month: 10,
            day: 21,
            hour: 12,
            minute: 36,
            second: 5,
            fraction: 123_456_789,
        };
        let bytes = ts.to_bytes();
        assert_eq!(bytes.len(), TimestampStruct::SIZE);
        assert_eq!(TimestampStruct::decode(&bytes).unwrap(), ts);

        let dt = ts.to_datetime(Tz::UTC).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 10);
        assert_eq!(dt.day(), 21);
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 36);
        assert_eq!(dt.second(), 5);
        assert_eq!(dt.nanosecond(), 123_456_789);
    }

    #[test]
    fn test_timestamp_in_named_zone() {
        let ts = TimestampStruct {
            year: 2024,
            month: 7,
            day: 1,
            hour: 9,
            ..Default::default()
        };
        let dt = ts.to_datetime(chrono_tz::America::New_York).unwrap();
        // EDT is UTC-4.
        assert_eq!(dt.naive_utc().hour(), 13);
    }

    #[test]
    fn test_decode_date_midnight() {
        let d = DateStruct {
            year: 1999,
            month: 6,
            day: 15,
        };
        let dt = DateStruct::decode(&d.to_bytes())
            .unwrap()
            .to_datetime(Tz::UTC)
            .unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1999, 6, 15));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn test_decode_time_on_zero_date() {
        let t = TimeStruct {
            hour: 23,
            minute: 59,
            second: 58,
        };
        let dt = TimeStruct::decode(&t.to_bytes())
            .unwrap()
            .to_datetime(Tz::UTC)
            .unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1, 1, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 58));
    }

    #[test]
    fn test_decode_time2_fraction() {
        let t = Time2Struct {
            hour: 8,
            minute: 15,
            second: 0,
            fraction: 500_000_000,
        };
        let bytes = t.to_bytes();
        assert_eq!(bytes.len(), Time2Struct::SIZE);
        let dt = Time2Struct::decode(&bytes)
            .unwrap()
            .to_datetime(Tz::UTC)
            .unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 15);
        assert_eq!(dt.nanosecond(), 500_000_000);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(matches!(
            TimestampStruct::decode(&[0u8; 15]),
            Err(Error::MalformedData { .. })
        ));
        assert!(DateStruct::decode(&[0u8; 8]).is_err());
        assert!(TimeStruct::decode(&[]).is_err());
        assert!(Time2Struct::decode(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_invalid_month() {
        let d = DateStruct {
            year: 2024,
            month: 13,
            day: 1,
        };
        assert!(matches!(
            d.to_datetime(Tz::UTC),
            Err(Error::MalformedData { .. })
        ));
    }

    #[test]
    fn test_dst_gap_rejected() {
        // 02:30 on 2024-03-10 does not exist in New York.
        let ts = TimestampStruct {
            year: 2024,
            month: 3,
            day: 10,
            hour: 2,
            minute: 30,
            ..Default::default()
        };
        assert!(ts.to_datetime(chrono_tz::America::New_York).is_err());
    }
}
