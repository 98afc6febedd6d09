//! High-level connection API.
//!
//! A [`Connection`] holds the parsed connection string and driver
//! configuration. It turns backend statements into cursors (queries) or
//! [`ExecResult`]s (everything else).

use std::sync::Arc;

use chrono_tz::Tz;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::cursor::RowCursor;
use crate::error::{Error, Result};
use crate::protocol::backend::Backend;
use crate::protocol::connect::ConnectParams;

/// Driver-wide settings shared by every cursor of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverConfig {
    /// Zone used for date/time columns without a connection override.
    /// `None` means UTC.
    pub default_timezone: Option<Tz>,
    /// Bind VARCHAR, WVARCHAR and VARBINARY columns by their declared size.
    /// Off by default: some backends declare sizes smaller than the data
    /// they return, so these columns are always streamed.
    pub trust_varchar_size: bool,
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_timezone(mut self, tz: Tz) -> Self {
        self.default_timezone = Some(tz);
        self
    }

    pub fn with_trusted_varchar_size(mut self, trust: bool) -> Self {
        self.trust_varchar_size = trust;
        self
    }
}

/// Outcome of a statement that produces no result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    row_count: i64,
}

impl ExecResult {
    pub fn new(row_count: i64) -> Self {
        Self { row_count }
    }

    /// Rows affected as reported by the backend.
    pub fn rows_affected(&self) -> i64 {
        self.row_count
    }

    /// Not provided by this driver.
    pub fn last_insert_id(&self) -> Result<i64> {
        Err(Error::NotImplemented {
            feature: "LastInsertId",
        })
    }
}

/// A configured connection.
#[derive(Debug, Clone)]
pub struct Connection {
    params: ConnectParams,
    config: Arc<DriverConfig>,
}

impl Connection {
    /// Parse `dsn` and create a connection.
    ///
    /// Fails with [`Error::Config`] if the connection string names a zone
    /// that cannot be resolved.
    ///
    /// # Example
    ///
    /// ```
    /// use odbc_fetch_rs::{Connection, DriverConfig};
    ///
    /// let conn = Connection::open(
    ///     "Driver=Memory;SSP_timezone=Europe/Berlin;",
    ///     DriverConfig::default(),
    /// ).unwrap();
    /// assert_eq!(conn.timezone(), Some(chrono_tz::Europe::Berlin));
    ///
    /// assert!(Connection::open("SSP_timezone=GMT-8;", DriverConfig::default()).is_err());
    /// ```
    pub fn open(dsn: &str, config: DriverConfig) -> Result<Self> {
        let params = ConnectParams::parse(dsn)?;
        Ok(Self::with_params(params, config))
    }

    /// Create a connection from already parsed parameters.
    pub fn with_params(params: ConnectParams, config: DriverConfig) -> Self {
        debug!(
            timezone = ?params.timezone,
            default_timezone = ?config.default_timezone,
            trust_varchar_size = config.trust_varchar_size,
            "Opened connection"
        );
        Self {
            params,
            config: Arc::new(config),
        }
    }

    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Zone override taken from the connection string.
    pub fn timezone(&self) -> Option<Tz> {
        self.params.timezone
    }

    /// Open a cursor over the result set of an executed statement.
    pub fn query<B: Backend>(&self, statement: B) -> Result<RowCursor<B>> {
        self.query_with_cancel(statement, CancelToken::new())
    }

    /// Like [`query`](Self::query), aborting operations once `cancel` fires.
    pub fn query_with_cancel<B: Backend>(
        &self,
        statement: B,
        cancel: CancelToken,
    ) -> Result<RowCursor<B>> {
        RowCursor::new(
            statement,
            self.params.timezone,
            Arc::clone(&self.config),
            cancel,
        )
    }

    /// Collect the outcome of an executed statement without a result set.
    pub fn exec<B: Backend>(&self, statement: &mut B) -> Result<ExecResult> {
        let rows = statement
            .row_count()
            .map_err(|d| Error::fetch("SQLRowCount", d))?;
        Ok(ExecResult::new(rows))
    }
}
