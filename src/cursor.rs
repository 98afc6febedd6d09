//! Cursor over the rows of a result set.
//!
//! The `Cursor` trait defines the row iteration interface. `RowCursor`
//! implements it on top of a [`Backend`], planning one retrieval strategy per
//! column when a result set opens and decoding the current row on demand.

use std::sync::Arc;

use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::column::{describe_column, plan_column, ColumnPlan, PlanOptions};
use crate::connection::DriverConfig;
use crate::error::{Error, Result};
use crate::protocol::backend::{Backend, BindTarget};
use crate::protocol::decode::TimezoneContext;
use crate::protocol::types::{ColumnDescriptor, ColumnInfo, Row, Value};

/// Base trait for row cursors.
///
/// # Example
///
/// ```
/// use odbc_fetch_rs::{Cursor, Result};
///
/// fn count_rows<C: Cursor>(cursor: &mut C) -> Result<u64> {
///     let mut count = 0;
///     while cursor.advance()? {
///         count += 1;
///     }
///     Ok(count)
/// }
/// ```
pub trait Cursor {
    /// Column descriptors of the current result set.
    fn columns(&self) -> &[ColumnDescriptor];

    /// Shared column information handed to every [`Row`].
    fn column_info(&self) -> Arc<ColumnInfo>;

    /// Number of rows fetched so far across all result sets.
    fn rowcount(&self) -> u64;

    /// True after `close` or a cancellation.
    fn is_closed(&self) -> bool;

    /// Move to the next row. Returns `Ok(false)` when the result set is
    /// exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Decode every column of the current row, in column order.
    fn values(&mut self) -> Result<Vec<Value>>;

    /// Switch to the next result set. Returns `Ok(false)` when none remain.
    fn next_result_set(&mut self) -> Result<bool>;

    /// Close the cursor and release backend resources. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Advance and decode in one step. Returns `Ok(None)` when exhausted.
    fn next_row(&mut self) -> Result<Option<Row>> {
        if !self.advance()? {
            return Ok(None);
        }
        let values = self.values()?;
        Ok(Some(Row::new(values, self.column_info())))
    }

    /// Fetch all remaining rows of the current result set.
    fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Open,
    Closed,
    Cancelled,
}

/// Row-by-row cursor over a backend statement.
///
/// # Lifecycle
///
/// 1. Created by [`Connection::query`](crate::Connection::query), which plans
///    and binds the first result set.
/// 2. Iterated via `advance` + `values`, `next_row`, `rows()` or `fetch_all`.
/// 3. Moved to later result sets via `next_result_set`.
/// 4. Closed explicitly via `close`, or on drop.
///
/// A fired [`CancelToken`] aborts the operation in progress and leaves the
/// cursor closed; every later call fails with [`Error::CursorClosed`] without
/// reaching the backend.
///
/// # Example
///
/// ```
/// use odbc_fetch_rs::protocol::constants::SQL_INTEGER;
/// use odbc_fetch_rs::protocol::memory::{Cell, MemoryBackend, MemoryColumn, MemoryResultSet};
/// use odbc_fetch_rs::{Connection, Cursor, DriverConfig, Value};
///
/// let conn = Connection::open("Driver=Memory;", DriverConfig::default()).unwrap();
/// let backend = MemoryBackend::new().with_result_set(
///     MemoryResultSet::new(vec![MemoryColumn::new("id", SQL_INTEGER, 10)])
///         .row(vec![Cell::long(42)]),
/// );
/// let mut cursor = conn.query(backend).unwrap();
/// while cursor.advance().unwrap() {
///     assert_eq!(cursor.values().unwrap(), vec![Value::I32(42)]);
/// }
/// ```
pub struct RowCursor<B: Backend> {
    backend: B,
    info: Arc<ColumnInfo>,
    plans: Vec<ColumnPlan>,
    config: Arc<DriverConfig>,
    /// Zone override from the connection string.
    timezone: Option<Tz>,
    cancel: CancelToken,
    state: CursorState,
    /// Whether `advance` positioned the cursor on a row.
    has_row: bool,
    /// Result set returned no more rows.
    exhausted: bool,
    /// Values already decoded for the current row.
    current: Option<Vec<Value>>,
    rows_fetched: u64,
}

impl<B: Backend> RowCursor<B> {
    /// Open a cursor on `backend`, planning and binding its current result
    /// set.
    pub fn new(
        backend: B,
        timezone: Option<Tz>,
        config: Arc<DriverConfig>,
        cancel: CancelToken,
    ) -> Result<Self> {
        let mut cursor = Self {
            backend,
            info: Arc::new(ColumnInfo::default()),
            plans: Vec::new(),
            config,
            timezone,
            cancel,
            state: CursorState::Open,
            has_row: false,
            exhausted: false,
            current: None,
            rows_fetched: 0,
        };
        cursor.open_result_set()?;
        Ok(cursor)
    }

    /// Describe, plan and bind every column of the current result set.
    fn open_result_set(&mut self) -> Result<()> {
        let count = self
            .backend
            .num_result_cols()
            .map_err(|d| Error::fetch("SQLNumResultCols", d))?;
        let options = PlanOptions {
            timezone: self.timezone,
            trust_varchar_size: self.config.trust_varchar_size,
        };

        let mut descriptors = Vec::with_capacity(count);
        let mut plans = Vec::with_capacity(count);
        for column in 0..count {
            let raw = describe_column(&mut self.backend, column)?;
            let (descriptor, mut plan) = plan_column(column, &raw, &options)?;
            if let ColumnPlan::Bound(bound) = &mut plan {
                if let Err(e) = bound.register(&mut self.backend, column) {
                    debug!(column, error = %e, "Falling back to on-demand retrieval");
                }
            }
            descriptors.push(descriptor);
            plans.push(plan);
        }

        debug!(
            columns = count,
            bound = plans.iter().filter(|p| p.is_bound()).count(),
            "Opened result set"
        );
        self.info = Arc::new(ColumnInfo::new(descriptors));
        self.plans = plans;
        self.has_row = false;
        self.exhausted = false;
        self.current = None;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            CursorState::Open => Ok(()),
            CursorState::Closed | CursorState::Cancelled => Err(Error::CursorClosed),
        }
    }

    /// Abandon the statement after the cancel token fired while `function`
    /// was pending, and leave the cursor unusable.
    fn abort(&mut self, function: &'static str) -> Error {
        warn!(function, "Operation cancelled");
        if let Err(d) = self.backend.cancel() {
            warn!(error = %d, "SQLCancel failed");
        }
        self.state = CursorState::Cancelled;
        self.has_row = false;
        self.current = None;
        Error::Cancelled { function }
    }

    /// Route a failed operation: cancellations poison the cursor.
    fn fail(&mut self, err: Error) -> Error {
        match err {
            Error::Cancelled { function } => self.abort(function),
            other => other,
        }
    }

    /// Whether column `index` is filled during row fetch. `None` when out of
    /// range.
    pub fn is_bound(&self, index: usize) -> Option<bool> {
        self.plans.get(index).map(ColumnPlan::is_bound)
    }

    /// Descriptor of column `index`.
    pub fn column(&self, index: usize) -> Result<&ColumnDescriptor> {
        self.info
            .get(index)
            .ok_or_else(|| Error::ColumnIndexOutOfBounds {
                index,
                count: self.info.len(),
            })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.info.column_names()
    }

    pub fn num_columns(&self) -> usize {
        self.info.len()
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Iterate over the remaining rows of the current result set.
    pub fn rows(&mut self) -> Rows<'_, B> {
        Rows {
            cursor: self,
            done: false,
        }
    }
}

impl<B: Backend> Cursor for RowCursor<B> {
    fn columns(&self) -> &[ColumnDescriptor] {
        &self.info.columns
    }

    fn column_info(&self) -> Arc<ColumnInfo> {
        Arc::clone(&self.info)
    }

    fn rowcount(&self) -> u64 {
        self.rows_fetched
    }

    fn is_closed(&self) -> bool {
        self.state != CursorState::Open
    }

    fn advance(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.exhausted {
            return Ok(false);
        }
        if let Err(e) = self.cancel.check("SQLFetch") {
            return Err(self.fail(e));
        }

        self.current = None;
        let mut targets: Vec<BindTarget<'_>> = self
            .plans
            .iter_mut()
            .enumerate()
            .filter_map(|(column, plan)| match plan {
                ColumnPlan::Bound(bound) => bound.bind_target(column),
                ColumnPlan::Streamed(_) => None,
            })
            .collect();
        let fetched = self.backend.fetch(&mut targets);
        drop(targets);

        match fetched {
            Ok(true) => {
                self.has_row = true;
                self.rows_fetched += 1;
                Ok(true)
            }
            Ok(false) => {
                self.has_row = false;
                self.exhausted = true;
                debug!(rows = self.rows_fetched, "Result set exhausted");
                Ok(false)
            }
            Err(d) => {
                self.has_row = false;
                Err(Error::fetch("SQLFetch", d))
            }
        }
    }

    fn values(&mut self) -> Result<Vec<Value>> {
        self.ensure_open()?;
        if !self.has_row {
            return Err(Error::NoCurrentRow);
        }
        if let Some(values) = &self.current {
            return Ok(values.clone());
        }

        let default = self.config.default_timezone;
        let mut values = Vec::with_capacity(self.plans.len());
        let mut failure = None;
        for (column, plan) in self.plans.iter_mut().enumerate() {
            let tz = TimezoneContext::new(
                self.info.get(column).and_then(|c| c.timezone),
                default,
            );
            let value = match self.cancel.check("SQLGetData") {
                Ok(()) => plan.current_value(&mut self.backend, column, &tz, &self.cancel),
                Err(e) => Err(e),
            };
            match value {
                Ok(value) => values.push(value),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            return Err(self.fail(e));
        }

        self.current = Some(values.clone());
        Ok(values)
    }

    fn next_result_set(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if let Err(e) = self.cancel.check("SQLMoreResults") {
            return Err(self.fail(e));
        }
        let more = self
            .backend
            .more_results()
            .map_err(|d| Error::fetch("SQLMoreResults", d))?;
        self.has_row = false;
        self.current = None;
        if !more {
            self.exhausted = true;
            return Ok(false);
        }

        // Plans of the previous result set must never read the new one.
        self.info = Arc::new(ColumnInfo::default());
        self.plans.clear();
        self.exhausted = true;
        if let Err(e) = self.open_result_set() {
            warn!(error = %e, "Failed to open next result set");
            return Err(e);
        }
        Ok(true)
    }

    fn close(&mut self) -> Result<()> {
        match self.state {
            CursorState::Closed => return Ok(()),
            CursorState::Cancelled => {
                self.state = CursorState::Closed;
                return Ok(());
            }
            CursorState::Open => {}
        }
        self.state = CursorState::Closed;
        self.has_row = false;
        self.current = None;
        self.backend
            .close_cursor()
            .map_err(|d| Error::fetch("SQLCloseCursor", d))
    }
}

impl<B: Backend> Drop for RowCursor<B> {
    fn drop(&mut self) {
        if self.state == CursorState::Open {
            if let Err(e) = self.close() {
                warn!(error = %e, "Failed to close cursor on drop");
            }
        }
    }
}

/// Iterator over the rows of a [`RowCursor`]. Stops after the first error.
pub struct Rows<'c, B: Backend> {
    cursor: &'c mut RowCursor<B>,
    done: bool,
}

impl<B: Backend> Iterator for Rows<'_, B> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
