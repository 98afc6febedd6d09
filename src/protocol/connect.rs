//! Connection string handling.

use chrono_tz::Tz;
use tracing::debug;

use crate::error::{Error, Result};

/// Connection string key naming the zone applied to date/time columns.
pub const TIMEZONE_KEY: &str = "SSP_timezone=";

/// Parameters derived from a DSN-style connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    /// The connection string as given.
    pub dsn: String,
    /// Zone override for date/time columns, if the DSN names one.
    pub timezone: Option<Tz>,
}

impl ConnectParams {
    /// Parse a `key=value;` connection string.
    ///
    /// # Example
    ///
    /// ```
    /// use odbc_fetch_rs::ConnectParams;
    ///
    /// let params = ConnectParams::parse("Driver=X;SSP_timezone=Asia/Tokyo;").unwrap();
    /// assert_eq!(params.timezone, Some(chrono_tz::Asia::Tokyo));
    /// ```
    pub fn parse(dsn: &str) -> Result<Self> {
        Ok(Self {
            dsn: dsn.to_string(),
            timezone: extract_timezone(dsn)?,
        })
    }

    /// Override the zone taken from the connection string.
    pub fn with_timezone(mut self, timezone: Option<Tz>) -> Self {
        self.timezone = timezone;
        self
    }
}

/// Find `SSP_timezone=<name>;` in `dsn` and resolve the zone.
///
/// Returns `None` when the key is absent or has no terminating `;`. An empty
/// name (after trimming whitespace) means UTC. Names that do not resolve to a
/// known zone, such as `GMT-8`, are a configuration error.
pub fn extract_timezone(dsn: &str) -> Result<Option<Tz>> {
    let Some(start) = dsn.find(TIMEZONE_KEY) else {
        return Ok(None);
    };
    let rest = &dsn[start + TIMEZONE_KEY.len()..];
    let Some(end) = rest.find(';') else {
        return Ok(None);
    };

    let name = rest[..end].trim();
    if name.is_empty() {
        return Ok(Some(Tz::UTC));
    }
    let tz = name
        .parse::<Tz>()
        .map_err(|e| Error::config(format!("invalid timezone {:?}: {}", name, e)))?;
    debug!(timezone = %tz, "Timezone override from connection string");
    Ok(Some(tz))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key() {
        assert_eq!(extract_timezone("Driver=X;Server=y;").unwrap(), None);
        assert_eq!(extract_timezone("").unwrap(), None);
    }

    #[test]
    fn test_unterminated_value() {
        assert_eq!(extract_timezone("SSP_timezone=UTC").unwrap(), None);
    }

    #[test]
    fn test_empty_means_utc() {
        assert_eq!(extract_timezone("SSP_timezone=;").unwrap(), Some(Tz::UTC));
        assert_eq!(extract_timezone("SSP_timezone=   ;").unwrap(), Some(Tz::UTC));
    }

    #[test]
    fn test_named_zone() {
        assert_eq!(
            extract_timezone("A=b;SSP_timezone= America/New_York ;C=d;").unwrap(),
            Some(chrono_tz::America::New_York)
        );
        assert_eq!(
            extract_timezone("SSP_timezone=UTC;").unwrap(),
            Some(Tz::UTC)
        );
    }

    #[test]
    fn test_invalid_zone() {
        assert!(matches!(
            extract_timezone("SSP_timezone=GMT-8;"),
            Err(Error::Config { .. })
        ));
        assert!(ConnectParams::parse("SSP_timezone=Mars/Olympus;").is_err());
    }

    #[test]
    fn test_with_timezone() {
        let params = ConnectParams::parse("Driver=X;")
            .unwrap()
            .with_timezone(Some(chrono_tz::Europe::Paris));
        assert_eq!(params.timezone, Some(chrono_tz::Europe::Paris));
        assert_eq!(params.dsn, "Driver=X;");
    }
}
