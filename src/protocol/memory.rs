//! In-memory [`Backend`] for tests and examples.
//!
//! [`MemoryBackend`] serves scripted result sets with the retrieval
//! semantics of a native driver: bound buffers are filled on fetch, on-demand
//! retrieval is chunked with terminators and truncation warnings, and every
//! call is counted so tests can observe which path a column took.
//!
//! # Example
//!
//! ```
//! use odbc_fetch_rs::protocol::constants::SQL_INTEGER;
//! use odbc_fetch_rs::protocol::memory::{Cell, MemoryBackend, MemoryColumn, MemoryResultSet};
//!
//! let backend = MemoryBackend::new().with_result_set(
//!     MemoryResultSet::new(vec![MemoryColumn::new("id", SQL_INTEGER, 10)])
//!         .row(vec![Cell::long(1)])
//!         .row(vec![Cell::Null]),
//! );
//! assert_eq!(backend.calls().fetch, 0);
//! ```

use std::collections::{HashMap, HashSet};

use crate::cancel::CancelToken;
use crate::protocol::backend::{
    Backend, BackendResult, BindTarget, ColumnDescription, DataStatus, DiagRecord, Diagnostics,
    GetDataResponse,
};
use crate::protocol::constants::{
    SQL_C_CHAR, SQL_C_WCHAR, SQL_NO_TOTAL, SQL_NULLABLE, SQL_NULL_DATA,
    SQLSTATE_DATA_TRUNCATED,
};
use crate::protocol::decode::{
    encode_wchar, DateStruct, GuidStruct, Time2Struct, TimeStruct, TimestampStruct,
};

/// A stored column value in the layout the backend delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Raw(Vec<u8>),
}

impl Cell {
    pub fn bit(v: bool) -> Self {
        Cell::Raw(vec![v as u8])
    }

    pub fn long(v: i32) -> Self {
        Cell::Raw(v.to_ne_bytes().to_vec())
    }

    pub fn sbigint(v: i64) -> Self {
        Cell::Raw(v.to_ne_bytes().to_vec())
    }

    pub fn double(v: f64) -> Self {
        Cell::Raw(v.to_ne_bytes().to_vec())
    }

    /// Single-byte text, delivered as its UTF-8 bytes.
    pub fn text(s: &str) -> Self {
        Cell::Raw(s.as_bytes().to_vec())
    }

    /// Wide text, delivered as native-endian UTF-16.
    pub fn wtext(s: &str) -> Self {
        Cell::Raw(encode_wchar(s))
    }

    pub fn binary(b: &[u8]) -> Self {
        Cell::Raw(b.to_vec())
    }

    pub fn timestamp(ts: TimestampStruct) -> Self {
        Cell::Raw(ts.to_bytes())
    }

    pub fn date(d: DateStruct) -> Self {
        Cell::Raw(d.to_bytes())
    }

    pub fn time(t: TimeStruct) -> Self {
        Cell::Raw(t.to_bytes())
    }

    pub fn time2(t: Time2Struct) -> Self {
        Cell::Raw(t.to_bytes())
    }

    pub fn guid(g: GuidStruct) -> Self {
        Cell::Raw(g.to_bytes())
    }
}

/// Declared metadata of a scripted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryColumn {
    pub name: String,
    pub sql_type: i16,
    pub column_size: u64,
    pub nullable: i16,
}

impl MemoryColumn {
    pub fn new(name: impl Into<String>, sql_type: i16, column_size: u64) -> Self {
        Self {
            name: name.into(),
            sql_type,
            column_size,
            nullable: SQL_NULLABLE,
        }
    }

    pub fn nullable(mut self, nullable: i16) -> Self {
        self.nullable = nullable;
        self
    }
}

/// One scripted result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryResultSet {
    pub columns: Vec<MemoryColumn>,
    pub rows: Vec<Vec<Cell>>,
}

impl MemoryResultSet {
    pub fn new(columns: Vec<MemoryColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }
}

/// How truncated on-demand retrievals report the remaining length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TotalHint {
    /// The exact number of bytes remaining.
    #[default]
    Exact,
    /// Always `SQL_NO_TOTAL`.
    Unknown,
    /// The remaining length minus the given amount (never below zero).
    Understated(usize),
}

/// Number of calls made per backend operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub num_result_cols: usize,
    pub describe_column: usize,
    pub bind_column: usize,
    pub fetch: usize,
    pub get_data: usize,
    pub more_results: usize,
    pub row_count: usize,
    pub close_cursor: usize,
    pub cancel: usize,
}

impl CallCounts {
    /// Total calls across all operations.
    pub fn total(&self) -> usize {
        self.num_result_cols
            + self.describe_column
            + self.bind_column
            + self.fetch
            + self.get_data
            + self.more_results
            + self.row_count
            + self.close_cursor
            + self.cancel
    }
}

/// Scripted backend serving [`MemoryResultSet`]s in order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    result_sets: Vec<MemoryResultSet>,
    current_set: usize,
    /// Index of the current row in the current result set.
    row: Option<usize>,
    /// Bytes already delivered per column for the current row.
    consumed: HashMap<usize, usize>,
    bound: HashMap<usize, (i16, usize)>,
    closed: bool,
    rows_affected: i64,
    total_hint: TotalHint,
    failing_binds: HashSet<usize>,
    fail_get_data_call: Option<usize>,
    fail_fetch_call: Option<usize>,
    cancel_on_get_data: Option<(usize, CancelToken)>,
    calls: CallCounts,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result set.
    pub fn with_result_set(mut self, result_set: MemoryResultSet) -> Self {
        self.result_sets.push(result_set);
        self
    }

    /// Value reported by `row_count`.
    pub fn with_rows_affected(mut self, rows: i64) -> Self {
        self.rows_affected = rows;
        self
    }

    pub fn with_total_hint(mut self, hint: TotalHint) -> Self {
        self.total_hint = hint;
        self
    }

    /// Make `bind_column` fail for `column`.
    pub fn fail_bind(mut self, column: usize) -> Self {
        self.failing_binds.insert(column);
        self
    }

    /// Make the `n`-th `get_data` call (1-based) fail with a link error.
    pub fn fail_get_data_on_call(mut self, n: usize) -> Self {
        self.fail_get_data_call = Some(n);
        self
    }

    /// Make the `n`-th `fetch` call (1-based) fail with a link error.
    pub fn fail_fetch_on_call(mut self, n: usize) -> Self {
        self.fail_fetch_call = Some(n);
        self
    }

    /// Fire `token` while serving the `n`-th `get_data` call (1-based).
    pub fn cancel_on_get_data_call(mut self, n: usize, token: CancelToken) -> Self {
        self.cancel_on_get_data = Some((n, token));
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.calls
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Columns registered through `bind_column` for the current result set.
    pub fn bound_columns(&self) -> Vec<usize> {
        let mut columns: Vec<usize> = self.bound.keys().copied().collect();
        columns.sort_unstable();
        columns
    }

    fn result_set(&self) -> BackendResult<&MemoryResultSet> {
        self.result_sets
            .get(self.current_set)
            .ok_or_else(|| diag("24000", "Invalid cursor state"))
    }

    fn column(&self, column: usize) -> BackendResult<&MemoryColumn> {
        self.result_set()?
            .columns
            .get(column)
            .ok_or_else(|| diag("07009", "Invalid descriptor index"))
    }

    fn cell(&self, column: usize) -> BackendResult<&Cell> {
        let row = self.row.ok_or_else(|| diag("24000", "Invalid cursor state"))?;
        self.result_set()?
            .rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .ok_or_else(|| diag("07009", "Invalid descriptor index"))
    }

    fn ensure_open(&self) -> BackendResult<()> {
        if self.closed {
            return Err(diag("24000", "Invalid cursor state"));
        }
        Ok(())
    }

    fn hint(&self, remaining: usize) -> isize {
        match self.total_hint {
            TotalHint::Exact => remaining as isize,
            TotalHint::Unknown => SQL_NO_TOTAL,
            TotalHint::Understated(by) => remaining.saturating_sub(by) as isize,
        }
    }
}

fn diag(state: &str, message: &str) -> Diagnostics {
    Diagnostics::from(DiagRecord::new(state, 0, message))
}

fn terminator_len(c_type: i16) -> usize {
    match c_type {
        SQL_C_CHAR => 1,
        SQL_C_WCHAR => 2,
        _ => 0,
    }
}

impl Backend for MemoryBackend {
    fn num_result_cols(&mut self) -> BackendResult<usize> {
        self.calls.num_result_cols += 1;
        Ok(self.result_set()?.columns.len())
    }

    fn describe_column(
        &mut self,
        column: usize,
        name: &mut [u16],
    ) -> BackendResult<ColumnDescription> {
        self.calls.describe_column += 1;
        let col = self.column(column)?;
        let units: Vec<u16> = col.name.encode_utf16().collect();
        let copied = units.len().min(name.len());
        name[..copied].copy_from_slice(&units[..copied]);
        Ok(ColumnDescription {
            name_len: units.len(),
            sql_type: col.sql_type,
            column_size: col.column_size,
            decimal_digits: 0,
            nullable: col.nullable,
            with_info: units.len() > name.len(),
        })
    }

    fn bind_column(&mut self, column: usize, c_type: i16, capacity: usize) -> BackendResult<()> {
        self.calls.bind_column += 1;
        self.column(column)?;
        if self.failing_binds.contains(&column) {
            return Err(diag("HY003", "Program type out of range"));
        }
        self.bound.insert(column, (c_type, capacity));
        Ok(())
    }

    fn fetch(&mut self, targets: &mut [BindTarget<'_>]) -> BackendResult<bool> {
        self.calls.fetch += 1;
        self.ensure_open()?;
        if self.fail_fetch_call == Some(self.calls.fetch) {
            return Err(Diagnostics::from(DiagRecord::new(
                "08S01",
                10054,
                "Communication link failure",
            )));
        }

        let next = self.row.map_or(0, |r| r + 1);
        let available = self.result_set()?.rows.len();
        self.consumed.clear();
        if next >= available {
            self.row = Some(available);
            return Ok(false);
        }
        self.row = Some(next);

        for target in targets.iter_mut() {
            match self.cell(target.column)? {
                Cell::Null => *target.indicator = SQL_NULL_DATA,
                Cell::Raw(bytes) => {
                    let terminator = terminator_len(target.c_type);
                    let room = target.buffer.len().saturating_sub(terminator);
                    let copied = bytes.len().min(room);
                    target.buffer[..copied].copy_from_slice(&bytes[..copied]);
                    let end = (copied + terminator).min(target.buffer.len());
                    target.buffer[copied..end].fill(0);
                    *target.indicator = bytes.len() as isize;
                }
            }
        }
        Ok(true)
    }

    fn get_data(
        &mut self,
        column: usize,
        c_type: i16,
        buffer: &mut [u8],
    ) -> BackendResult<GetDataResponse> {
        self.calls.get_data += 1;
        self.ensure_open()?;
        if let Some((n, token)) = &self.cancel_on_get_data {
            if *n == self.calls.get_data {
                token.cancel();
            }
        }
        if self.fail_get_data_call == Some(self.calls.get_data) {
            return Err(Diagnostics::from(DiagRecord::new(
                "08S01",
                10054,
                "Communication link failure",
            )));
        }

        let bytes = match self.cell(column)? {
            Cell::Null => {
                return Ok(GetDataResponse {
                    indicator: SQL_NULL_DATA,
                    status: DataStatus::Complete,
                })
            }
            Cell::Raw(bytes) => bytes.clone(),
        };
        let offset = self.consumed.get(&column).copied().unwrap_or(0);
        if offset > 0 && offset >= bytes.len() {
            return Err(diag("HY010", "Function sequence error"));
        }
        let remaining = &bytes[offset..];
        let terminator = terminator_len(c_type);

        if remaining.len() + terminator <= buffer.len() {
            buffer[..remaining.len()].copy_from_slice(remaining);
            buffer[remaining.len()..remaining.len() + terminator].fill(0);
            self.consumed.insert(column, bytes.len().max(1));
            return Ok(GetDataResponse {
                indicator: remaining.len() as isize,
                status: DataStatus::Complete,
            });
        }

        let room = buffer.len().saturating_sub(terminator);
        buffer[..room].copy_from_slice(&remaining[..room]);
        buffer[room..].fill(0);
        self.consumed.insert(column, offset + room);
        Ok(GetDataResponse {
            indicator: self.hint(remaining.len()),
            status: DataStatus::WithInfo(diag(
                SQLSTATE_DATA_TRUNCATED,
                "String data, right truncated",
            )),
        })
    }

    fn more_results(&mut self) -> BackendResult<bool> {
        self.calls.more_results += 1;
        self.ensure_open()?;
        if self.current_set + 1 >= self.result_sets.len() {
            return Ok(false);
        }
        self.current_set += 1;
        self.row = None;
        self.consumed.clear();
        self.bound.clear();
        Ok(true)
    }

    fn row_count(&mut self) -> BackendResult<i64> {
        self.calls.row_count += 1;
        Ok(self.rows_affected)
    }

    fn close_cursor(&mut self) -> BackendResult<()> {
        self.calls.close_cursor += 1;
        self.closed = true;
        self.row = None;
        self.bound.clear();
        Ok(())
    }

    fn cancel(&mut self) -> BackendResult<()> {
        self.calls.cancel += 1;
        Ok(())
    }
}
