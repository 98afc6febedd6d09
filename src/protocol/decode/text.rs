//! Text decoders for single-byte and wide character columns.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::types::Value;

/// Single-byte text is passed through unchanged. UTF-8 data becomes text;
/// anything else (an ANSI code page, say) is returned as raw bytes.
pub fn decode_char(bytes: &[u8]) -> Value {
    match std::str::from_utf8(bytes) {
        Ok(s) => Value::Text(s.to_string()),
        Err(_) => Value::Bytes(Bytes::copy_from_slice(bytes)),
    }
}

/// Transcode native-endian UTF-16 code units to UTF-8. Unpaired surrogates
/// become U+FFFD.
pub fn decode_wchar(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::malformed(format!(
            "WCHAR value has odd byte length {}",
            bytes.len()
        )));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}

/// Encode text the way a backend delivers wide character data.
pub fn encode_wchar(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_ne_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_char() {
        assert_eq!(decode_char(b"hello"), Value::Text("hello".to_string()));
        assert_eq!(decode_char(b""), Value::Text(String::new()));
        assert_eq!(
            decode_char(&[0x43, 0x61, 0x66, 0xE9]),
            Value::Bytes(Bytes::from_static(&[0x43, 0x61, 0x66, 0xE9]))
        );
    }

    #[test]
    fn test_decode_wchar() {
        let s = "Grüße, 世界 🦀";
        assert_eq!(decode_wchar(&encode_wchar(s)).unwrap(), s);
        assert_eq!(decode_wchar(&[]).unwrap(), "");
        assert!(decode_wchar(&[0x41]).is_err());
    }

    #[test]
    fn test_decode_wchar_unpaired_surrogate() {
        let bytes = 0xD800u16.to_ne_bytes();
        assert_eq!(decode_wchar(&bytes).unwrap(), "\u{FFFD}");
    }
}
