//! GUID structure decoder.

use crate::error::{Error, Result};
use crate::protocol::buffer::{ReadBuffer, WriteBuffer};

/// GUID structure: `data1: u32, data2: u16, data3: u16, data4: [u8; 8]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuidStruct {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl GuidStruct {
    pub const SIZE: usize = 16;

    /// Decode from exactly 16 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != Self::SIZE {
            return Err(Error::malformed(format!(
                "GUID value must be exactly {} bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        }
        let mut buf = ReadBuffer::new(data);
        Ok(Self {
            data1: buf.read_u32_ne()?,
            data2: buf.read_u16_ne()?,
            data3: buf.read_u16_ne()?,
            data4: buf.read_array()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = WriteBuffer::with_capacity(Self::SIZE);
        buf.write_u32_ne(self.data1);
        buf.write_u16_ne(self.data2);
        buf.write_u16_ne(self.data3);
        buf.write_bytes(&self.data4);
        buf.freeze().to_vec()
    }
}

impl std::fmt::Display for GuidStruct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}
