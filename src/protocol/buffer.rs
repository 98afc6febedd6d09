//! Buffer utilities for reading and writing backend structures.
//!
//! The backend runs in-process, so every multi-byte field is in the
//! platform's native byte order.

use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// A bounds-checked reader over a fetched byte span.
pub struct ReadBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReadBuffer<'a> {
    /// Create a new read buffer over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Get the remaining bytes in the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if the buffer has at least `n` bytes remaining.
    pub fn has_remaining(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if !self.has_remaining(n) {
            return Err(Error::malformed(format!(
                "need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.remaining()
            )));
        }
        Ok(())
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Read a native-endian u16.
    pub fn read_u16_ne(&mut self) -> Result<u16> {
        Ok(u16::from_ne_bytes(self.read_array()?))
    }

    /// Read a native-endian i16.
    pub fn read_i16_ne(&mut self) -> Result<i16> {
        Ok(i16::from_ne_bytes(self.read_array()?))
    }

    /// Read a native-endian u32.
    pub fn read_u32_ne(&mut self) -> Result<u32> {
        Ok(u32::from_ne_bytes(self.read_array()?))
    }

    /// Read a native-endian i32.
    pub fn read_i32_ne(&mut self) -> Result<i32> {
        Ok(i32::from_ne_bytes(self.read_array()?))
    }

    /// Read a native-endian i64.
    pub fn read_i64_ne(&mut self) -> Result<i64> {
        Ok(i64::from_ne_bytes(self.read_array()?))
    }

    /// Read a native-endian f64.
    pub fn read_f64_ne(&mut self) -> Result<f64> {
        Ok(f64::from_ne_bytes(self.read_array()?))
    }

    /// Read raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}

/// A buffer for writing backend structures in native byte order.
pub struct WriteBuffer {
    data: BytesMut,
}

impl WriteBuffer {
    /// Create a new write buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a new write buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Get the current length of the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Freeze the buffer into immutable bytes.
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    /// Write a native-endian u16.
    pub fn write_u16_ne(&mut self, val: u16) {
        self.data.put_slice(&val.to_ne_bytes());
    }

    /// Write a native-endian i16.
    pub fn write_i16_ne(&mut self, val: i16) {
        self.data.put_slice(&val.to_ne_bytes());
    }

    /// Write a native-endian u32.
    pub fn write_u32_ne(&mut self, val: u32) {
        self.data.put_slice(&val.to_ne_bytes());
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write padding zeros.
    pub fn write_zeros(&mut self, count: usize) {
        self.data.put_bytes(0, count);
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_native_fields() {
        let mut w = WriteBuffer::new();
        w.write_i16_ne(-2024);
        w.write_u16_ne(12);
        w.write_u32_ne(999_999_999);
        w.write_zeros(2);
        w.write_bytes(&[7]);
        let bytes = w.freeze();

        let mut r = ReadBuffer::new(&bytes);
        assert_eq!(r.read_i16_ne().unwrap(), -2024);
        assert_eq!(r.read_u16_ne().unwrap(), 12);
        assert_eq!(r.read_u32_ne().unwrap(), 999_999_999);
        r.skip(2).unwrap();
        assert_eq!(r.read_bytes(1).unwrap(), &[7]);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_read_past_end() {
        let data = [1u8, 2, 3];
        let mut r = ReadBuffer::new(&data);
        assert_eq!(r.read_bytes(2).unwrap(), &[1, 2]);
        match r.read_u16_ne() {
            Err(Error::MalformedData { message }) => {
                assert_eq!(message, "need 2 bytes at offset 2, have 1")
            }
            other => panic!("expected MalformedData, got {:?}", other),
        }
        // A failed read does not advance.
        assert_eq!(r.remaining(), 1);
    }
}
