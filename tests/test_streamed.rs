//! Integration tests for chunked on-demand retrieval of wide columns.

use std::collections::VecDeque;

use odbc_fetch_rs::protocol::backend::{
    Backend, BackendResult, BindTarget, ColumnDescription, DataStatus, DiagRecord, Diagnostics,
    GetDataResponse,
};
use odbc_fetch_rs::protocol::constants::*;
use odbc_fetch_rs::protocol::memory::{
    Cell, MemoryBackend, MemoryColumn, MemoryResultSet, TotalHint,
};
use odbc_fetch_rs::{Connection, Cursor, DriverConfig, Error, Value};

fn connect() -> Connection {
    Connection::open("Driver=Memory;", DriverConfig::default()).unwrap()
}

fn alphabet(len: usize) -> String {
    (0..len).map(|i| (b'a' + (i % 26) as u8) as char).collect()
}

/// Fetch the single value of a one-row, one-column result set, returning it
/// along with the number of on-demand retrieval calls made.
fn fetch_single(column: MemoryColumn, cell: Cell, hint: TotalHint) -> (Value, usize) {
    let backend = MemoryBackend::new()
        .with_total_hint(hint)
        .with_result_set(MemoryResultSet::new(vec![column]).row(vec![cell]));
    let mut cursor = connect().query(backend).unwrap();
    assert_eq!(cursor.is_bound(0), Some(false));
    assert!(cursor.advance().unwrap());
    let mut values = cursor.values().unwrap();
    (values.remove(0), cursor.backend().calls().get_data)
}

#[test]
fn test_large_text_grows_buffer_from_hint() {
    let text = alphabet(5000);
    let (value, calls) = fetch_single(
        MemoryColumn::new("body", SQL_LONGVARCHAR, 0),
        Cell::text(&text),
        TotalHint::Exact,
    );
    assert_eq!(value, Value::Text(text));
    assert_eq!(calls, 2);
}

#[test]
fn test_large_wide_text_with_surrogates() {
    let text = "ab🦀ü".repeat(1000);
    let (value, calls) = fetch_single(
        MemoryColumn::new("body", SQL_WLONGVARCHAR, 0),
        Cell::wtext(&text),
        TotalHint::Exact,
    );
    assert_eq!(value.as_str(), Some(text.as_str()));
    assert_eq!(calls, 2);
}

#[test]
fn test_large_binary() {
    let data: Vec<u8> = (0..3000).map(|i| (i % 251) as u8).collect();
    let (value, calls) = fetch_single(
        MemoryColumn::new("blob", SQL_LONGVARBINARY, 0),
        Cell::binary(&data),
        TotalHint::Exact,
    );
    assert_eq!(value.as_bytes(), Some(data.as_slice()));
    assert_eq!(calls, 2);
}

#[test]
fn test_unknown_total_keeps_chunk_size() {
    let text = alphabet(5000);
    let (value, calls) = fetch_single(
        MemoryColumn::new("body", SQL_LONGVARCHAR, 0),
        Cell::text(&text),
        TotalHint::Unknown,
    );
    assert_eq!(value, Value::Text(text));
    // 1023 payload bytes per truncated round, then a final partial round.
    assert_eq!(calls, 5);
}

#[test]
fn test_understated_total_still_reassembles() {
    let text = alphabet(5000);
    let (value, calls) = fetch_single(
        MemoryColumn::new("body", SQL_LONGVARCHAR, 0),
        Cell::text(&text),
        TotalHint::Understated(1000),
    );
    assert_eq!(value, Value::Text(text));
    assert_eq!(calls, 3);
}

#[test]
fn test_chunk_boundaries() {
    let exact = alphabet(STREAM_CHUNK_SIZE - 1);
    let (value, calls) = fetch_single(
        MemoryColumn::new("body", SQL_LONGVARCHAR, 0),
        Cell::text(&exact),
        TotalHint::Exact,
    );
    assert_eq!(value, Value::Text(exact));
    assert_eq!(calls, 1);

    let one_over = alphabet(STREAM_CHUNK_SIZE);
    let (value, calls) = fetch_single(
        MemoryColumn::new("body", SQL_LONGVARCHAR, 0),
        Cell::text(&one_over),
        TotalHint::Exact,
    );
    assert_eq!(value, Value::Text(one_over));
    assert_eq!(calls, 2);
}

#[test]
fn test_empty_and_null_are_distinct() {
    let (value, _) = fetch_single(
        MemoryColumn::new("body", SQL_LONGVARCHAR, 0),
        Cell::text(""),
        TotalHint::Exact,
    );
    assert_eq!(value, Value::Text(String::new()));

    let (value, calls) = fetch_single(
        MemoryColumn::new("body", SQL_WLONGVARCHAR, 0),
        Cell::Null,
        TotalHint::Exact,
    );
    assert_eq!(value, Value::Null);
    assert_eq!(calls, 1);
}

#[test]
fn test_wide_declared_char_is_streamed() {
    let text = alphabet(2000);
    let (value, calls) = fetch_single(
        MemoryColumn::new("wide", SQL_CHAR, 2000),
        Cell::text(&text),
        TotalHint::Exact,
    );
    assert_eq!(value, Value::Text(text));
    assert_eq!(calls, 2);
}

#[test]
fn test_get_data_failure_mid_stream() {
    let backend = MemoryBackend::new()
        .fail_get_data_on_call(2)
        .with_result_set(
            MemoryResultSet::new(vec![MemoryColumn::new("body", SQL_LONGVARCHAR, 0)])
                .row(vec![Cell::text(&alphabet(5000))]),
        );
    let mut cursor = connect().query(backend).unwrap();
    assert!(cursor.advance().unwrap());
    match cursor.values() {
        Err(Error::Fetch {
            function,
            diagnostics,
        }) => {
            assert_eq!(function, "SQLGetData");
            assert_eq!(diagnostics.first_state(), Some("08S01"));
        }
        other => panic!("expected Fetch error, got {:?}", other),
    }
    assert!(!cursor.is_closed());
}

/// Single-column backend replaying scripted `get_data` responses.
struct ScriptedBackend {
    responses: VecDeque<GetDataResponse>,
    fetched: bool,
}

impl ScriptedBackend {
    fn new(responses: Vec<GetDataResponse>) -> Self {
        Self {
            responses: responses.into(),
            fetched: false,
        }
    }
}

impl Backend for ScriptedBackend {
    fn num_result_cols(&mut self) -> BackendResult<usize> {
        Ok(1)
    }

    fn describe_column(
        &mut self,
        _column: usize,
        name: &mut [u16],
    ) -> BackendResult<ColumnDescription> {
        name[0] = u16::from(b'c');
        Ok(ColumnDescription {
            name_len: 1,
            sql_type: SQL_LONGVARCHAR,
            column_size: 0,
            decimal_digits: 0,
            nullable: SQL_NULLABLE,
            with_info: false,
        })
    }

    fn bind_column(&mut self, _column: usize, _c_type: i16, _capacity: usize) -> BackendResult<()> {
        Ok(())
    }

    fn fetch(&mut self, _targets: &mut [BindTarget<'_>]) -> BackendResult<bool> {
        let first = !self.fetched;
        self.fetched = true;
        Ok(first)
    }

    fn get_data(
        &mut self,
        _column: usize,
        _c_type: i16,
        buffer: &mut [u8],
    ) -> BackendResult<GetDataResponse> {
        buffer.fill(b'z');
        self.responses
            .pop_front()
            .ok_or_else(|| Diagnostics::from(DiagRecord::new("HY010", 0, "no more data")))
    }

    fn more_results(&mut self) -> BackendResult<bool> {
        Ok(false)
    }

    fn row_count(&mut self) -> BackendResult<i64> {
        Ok(0)
    }

    fn close_cursor(&mut self) -> BackendResult<()> {
        Ok(())
    }

    fn cancel(&mut self) -> BackendResult<()> {
        Ok(())
    }
}

fn scripted_values(responses: Vec<GetDataResponse>) -> Result<Vec<Value>, Error> {
    let mut cursor = connect().query(ScriptedBackend::new(responses))?;
    assert!(cursor.advance()?);
    cursor.values()
}

#[test]
fn test_non_truncation_warning_is_fetch_error() {
    let result = scripted_values(vec![GetDataResponse {
        indicator: 10,
        status: DataStatus::WithInfo(Diagnostics::from(DiagRecord::new(
            "01S07",
            0,
            "Fractional truncation",
        ))),
    }]);
    match result {
        Err(Error::Fetch {
            function,
            diagnostics,
        }) => {
            assert_eq!(function, "SQLGetData");
            assert_eq!(diagnostics.first_state(), Some("01S07"));
        }
        other => panic!("expected Fetch error, got {:?}", other),
    }
}

#[test]
fn test_overlong_indicator_is_protocol_violation() {
    let result = scripted_values(vec![GetDataResponse {
        indicator: 2000,
        status: DataStatus::Complete,
    }]);
    match result {
        Err(Error::ProtocolViolation { message }) => assert_eq!(
            message,
            "too much data returned: 2000 bytes returned, but buffer size is 1024"
        ),
        other => panic!("expected ProtocolViolation, got {:?}", other),
    }
}

#[test]
fn test_warning_without_records_is_truncation() {
    let values = scripted_values(vec![
        GetDataResponse {
            indicator: SQL_NO_TOTAL,
            status: DataStatus::WithInfo(Diagnostics::empty()),
        },
        GetDataResponse {
            indicator: 3,
            status: DataStatus::Complete,
        },
    ])
    .unwrap();
    assert_eq!(values, vec![Value::Text("z".repeat(1026))]);
}

#[test]
fn test_invalid_indicator() {
    let result = scripted_values(vec![GetDataResponse {
        indicator: -7,
        status: DataStatus::Complete,
    }]);
    assert!(matches!(result, Err(Error::ProtocolViolation { .. })));
}

#[test]
fn test_unsatisfiable_total_is_protocol_violation() {
    let result = scripted_values(vec![GetDataResponse {
        indicator: isize::MAX,
        status: DataStatus::WithInfo(Diagnostics::from(DiagRecord::new(
            SQLSTATE_DATA_TRUNCATED,
            0,
            "String data, right truncated",
        ))),
    }]);
    match result {
        Err(Error::ProtocolViolation { message }) => {
            assert!(message.starts_with("cannot grow column #1 buffer"), "{}", message)
        }
        other => panic!("expected ProtocolViolation, got {:?}", other),
    }
}
