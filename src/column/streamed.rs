//! Columns retrieved in chunks with a growing buffer.

use bytes::BytesMut;
use tracing::trace;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::protocol::backend::{Backend, DataStatus, Indicator};
use crate::protocol::constants::{STREAM_CHUNK_SIZE, TERMINATOR_HEADROOM};
use crate::protocol::decode::{decode_value, TimezoneContext};
use crate::protocol::types::{DecodeType, Value};

/// A column of unbounded or untrusted width, fetched on demand for every
/// row.
#[derive(Debug, Clone, Copy)]
pub struct StreamedColumn {
    decode_type: DecodeType,
}

impl StreamedColumn {
    pub fn new(decode_type: DecodeType) -> Self {
        Self { decode_type }
    }

    pub fn decode_type(&self) -> DecodeType {
        self.decode_type
    }

    /// Retrieve and decode the value of the current row.
    pub fn current_value<B: Backend>(
        &self,
        backend: &mut B,
        column: usize,
        tz: &TimezoneContext,
        cancel: &CancelToken,
    ) -> Result<Value> {
        match self.read_bytes(backend, column, cancel)? {
            None => Ok(Value::Null),
            Some(bytes) => decode_value(self.decode_type, &bytes, tz),
        }
    }

    /// Accumulate every chunk of the current value. Returns `None` for NULL.
    ///
    /// Each truncated round contributes its buffer minus the terminator. A
    /// total-length hint grows the buffer so the rest fits in one more round;
    /// without a hint the buffer keeps its size.
    pub fn read_bytes<B: Backend>(
        &self,
        backend: &mut B,
        column: usize,
        cancel: &CancelToken,
    ) -> Result<Option<BytesMut>> {
        let c_type = self.decode_type.c_type();
        let terminator = self.decode_type.terminator_len();
        let mut chunk = vec![0u8; STREAM_CHUNK_SIZE];
        let mut total = BytesMut::new();
        let mut round = 0usize;

        loop {
            cancel.check("SQLGetData")?;
            round += 1;

            let response = backend
                .get_data(column, c_type, &mut chunk)
                .map_err(|d| Error::fetch("SQLGetData", d))?;
            let indicator = Indicator::from_raw(response.indicator)?;

            match response.status {
                DataStatus::Complete => {
                    let len = match indicator {
                        Indicator::Null => return Ok(None),
                        Indicator::NoTotal => {
                            return Err(Error::protocol(
                                "unknown length reported for the final chunk",
                            ))
                        }
                        Indicator::Length(len) => len,
                    };
                    if len > chunk.len() {
                        return Err(Error::protocol(format!(
                            "too much data returned: {} bytes returned, but buffer size is {}",
                            len,
                            chunk.len()
                        )));
                    }
                    total.extend_from_slice(&chunk[..len]);
                    trace!(column, round, len = total.len(), "Streamed value complete");
                    return Ok(Some(total));
                }
                DataStatus::WithInfo(diagnostics) => {
                    if !diagnostics.is_truncation() {
                        return Err(Error::fetch("SQLGetData", diagnostics));
                    }
                    let filled = chunk.len() - terminator;
                    total.extend_from_slice(&chunk[..filled]);

                    match indicator {
                        Indicator::Length(remaining) => {
                            let needed = remaining.saturating_sub(filled) + TERMINATOR_HEADROOM;
                            if chunk.len() < needed {
                                chunk.try_reserve_exact(needed - chunk.len()).map_err(|e| {
                                    Error::protocol(format!(
                                        "cannot grow column #{} buffer to {} bytes: {}",
                                        column + 1,
                                        needed,
                                        e
                                    ))
                                })?;
                                chunk.resize(needed, 0);
                            }
                        }
                        Indicator::NoTotal => {}
                        Indicator::Null => {
                            return Err(Error::protocol("NULL indicator on a truncated chunk"))
                        }
                    }
                    trace!(
                        column,
                        round,
                        appended = filled,
                        next_chunk = chunk.len(),
                        "Streamed value truncated"
                    );
                }
            }
        }
    }
}
