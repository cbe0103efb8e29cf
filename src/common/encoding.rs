// src/common/encoding.rs
//
// Measurement data is transmitted in 2-, 3- or 4-character blocks: the value
// is split into 6-bit chunks and 0x30 is added to each chunk to make it
// printable ASCII. Decoding reverses the process.

use super::error::ScipError;

/// Smallest byte a data character may take after the 0x30 offset.
const CHAR_MIN: u8 = 0x30;
/// Largest byte a data character may take (0x30 + 0x3F).
const CHAR_MAX: u8 = 0x6F;

/// Decodes one 2-, 3- or 4-character block into its numeric value.
pub fn decode_block<E>(block: &[u8]) -> Result<u32, ScipError<E>>
where
    E: core::fmt::Debug,
{
    if !(2..=4).contains(&block.len()) {
        return Err(ScipError::MalformedFrame("data block must be 2-4 chars"));
    }
    let mut value: u32 = 0;
    for &byte in block {
        if !(CHAR_MIN..=CHAR_MAX).contains(&byte) {
            return Err(ScipError::MalformedFrame("data character out of range"));
        }
        value = (value << 6) | u32::from(byte - CHAR_MIN);
    }
    Ok(value)
}
