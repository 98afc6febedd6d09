//! Columns retrieved through a fixed, pre-registered buffer.

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::backend::{Backend, BindTarget, Indicator};
use crate::protocol::constants::MIN_BOUND_BUFFER;
use crate::protocol::decode::{decode_value, TimezoneContext};
use crate::protocol::types::{DecodeType, Value};

/// A column whose value fits a buffer sized from its declared width.
///
/// After a successful [`register`](Self::register) the backend fills the
/// buffer and indicator on every row fetch. If registration failed, the
/// same buffer is filled by a single on-demand retrieval per value.
#[derive(Debug)]
pub struct BoundColumn {
    decode_type: DecodeType,
    /// Exact byte length every non-null value must have; `None` for
    /// variable-width text and binary.
    expected_len: Option<usize>,
    buffer: Vec<u8>,
    indicator: isize,
    bound: bool,
}

impl BoundColumn {
    /// Column of a fixed-size decode type.
    pub fn fixed(decode_type: DecodeType, width: usize) -> Self {
        Self::with_buffer(decode_type, Some(width), width)
    }

    /// Variable-width column of at most `width` characters (or bytes).
    pub fn variable(decode_type: DecodeType, width: usize) -> Self {
        Self::with_buffer(decode_type, None, decode_type.bounded_buffer_len(width))
    }

    fn with_buffer(decode_type: DecodeType, expected_len: Option<usize>, len: usize) -> Self {
        Self {
            decode_type,
            expected_len,
            buffer: vec![0; len.max(MIN_BOUND_BUFFER)],
            indicator: 0,
            bound: false,
        }
    }

    pub fn decode_type(&self) -> DecodeType {
        self.decode_type
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is registered with the backend.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Register the buffer for `column`. On failure the column stays usable
    /// through on-demand retrieval.
    pub fn register<B: Backend>(&mut self, backend: &mut B, column: usize) -> Result<()> {
        backend
            .bind_column(column, self.decode_type.c_type(), self.buffer.len())
            .map_err(|diagnostics| Error::Bind {
                column,
                diagnostics,
            })?;
        self.bound = true;
        debug!(
            column,
            c_type = self.decode_type.label(),
            len = self.buffer.len(),
            "Bound column buffer"
        );
        Ok(())
    }

    /// Target handed to the backend on row fetch; `None` while unbound.
    pub(crate) fn bind_target(&mut self, column: usize) -> Option<BindTarget<'_>> {
        if !self.bound {
            return None;
        }
        Some(BindTarget {
            column,
            c_type: self.decode_type.c_type(),
            buffer: &mut self.buffer,
            indicator: &mut self.indicator,
        })
    }

    /// Decode the value of the current row.
    pub fn current_value<B: Backend>(
        &mut self,
        backend: &mut B,
        column: usize,
        tz: &TimezoneContext,
    ) -> Result<Value> {
        if !self.bound {
            let response = backend
                .get_data(column, self.decode_type.c_type(), &mut self.buffer)
                .map_err(|d| Error::fetch("SQLGetData", d))?;
            self.indicator = response.indicator;
        }

        let len = match Indicator::from_raw(self.indicator)? {
            Indicator::Null => return Ok(Value::Null),
            Indicator::NoTotal => {
                return Err(Error::protocol(format!(
                    "column #{} reported unknown length for a fixed buffer",
                    column + 1
                )))
            }
            Indicator::Length(len) => len,
        };

        if let Some(expected) = self.expected_len {
            if len != expected {
                return Err(Error::malformed(format!(
                    "wrong column #{} length {} returned, {} expected",
                    column + 1,
                    len,
                    expected
                )));
            }
        }
        let capacity = self.buffer.len() - self.decode_type.terminator_len();
        if len > capacity {
            return Err(Error::protocol(format!(
                "too much data returned: {} bytes returned, but buffer size is {}",
                len,
                self.buffer.len()
            )));
        }

        decode_value(self.decode_type, &self.buffer[..len], tz)
    }
}
