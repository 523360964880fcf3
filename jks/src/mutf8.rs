//! Modified UTF-8 as written by `java.io.DataOutput::writeUTF`.
//!
//! Differs from standard UTF-8 in two ways: `U+0000` is encoded as the two
//! bytes `C0 80`, and characters outside the BMP are encoded as a surrogate
//! pair, each half taking three bytes.

use crate::error::{JksError, Result};

/// Maximum encoded length, bounded by the `u16` length prefix.
pub const MAX_ENCODED_LEN: usize = u16::MAX as usize;

/// Encodes a string into modified UTF-8 (without the length prefix).
pub fn encode(s: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }

    if out.len() > MAX_ENCODED_LEN {
        return Err(JksError::StringTooLong(out.len()));
    }
    Ok(out)
}

/// Decodes modified UTF-8 bytes (without the length prefix).
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = continuation(bytes, i + 1)?;
            units.push((u16::from(b & 0x1F) << 6) | b2);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = continuation(bytes, i + 1)?;
            let b3 = continuation(bytes, i + 2)?;
            units.push((u16::from(b & 0x0F) << 12) | (b2 << 6) | b3);
            i += 3;
        } else {
            return Err(JksError::InvalidUtf8);
        }
    }

    String::from_utf16(&units).map_err(|_| JksError::InvalidUtf8)
}

fn continuation(bytes: &[u8], idx: usize) -> Result<u16> {
    match bytes.get(idx) {
        Some(b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        _ => Err(JksError::InvalidUtf8),
    }
}
