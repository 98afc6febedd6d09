//! Fixed-width scalar decoders (bit, integers, double).

use crate::error::{Error, Result};
use crate::protocol::buffer::ReadBuffer;

fn exact<'a>(what: &str, bytes: &'a [u8], size: usize) -> Result<ReadBuffer<'a>> {
    if bytes.len() != size {
        return Err(Error::malformed(format!(
            "{} value must be exactly {} bytes, got {}",
            what,
            size,
            bytes.len()
        )));
    }
    Ok(ReadBuffer::new(bytes))
}

/// First byte non-zero.
pub fn decode_bit(bytes: &[u8]) -> Result<bool> {
    match bytes.first() {
        Some(b) => Ok(*b != 0),
        None => Err(Error::malformed("BIT value is empty")),
    }
}

pub fn decode_long(bytes: &[u8]) -> Result<i32> {
    exact("LONG", bytes, 4)?.read_i32_ne()
}

pub fn decode_sbigint(bytes: &[u8]) -> Result<i64> {
    exact("SBIGINT", bytes, 8)?.read_i64_ne()
}

pub fn decode_double(bytes: &[u8]) -> Result<f64> {
    exact("DOUBLE", bytes, 8)?.read_f64_ne()
}
