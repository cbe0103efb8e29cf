// src/common/checksum.rs

use super::error::ScipError;

/// Calculates the SCIP2.0 line sum for the given payload.
///
/// The sum is the low six bits of the byte-wise sum of the payload, offset
/// by 0x30 so it lands in the printable ASCII range. Worked example from the
/// protocol notes: `"Hokuyo"` sums to 0x27F, low six bits 0x3F, plus 0x30
/// gives 0x6F (`'o'`).
#[inline]
pub fn checksum(payload: &[u8]) -> u8 {
    let sum: u32 = payload.iter().map(|&b| u32::from(b)).sum();
    ((sum & 0x3F) as u8) + 0x30
}

/// Verifies a payload against its trailing sum byte. Exact equality only.
#[inline]
pub fn verify(payload: &[u8], sum_byte: u8) -> bool {
    checksum(payload) == sum_byte
}

/// Verifies a line whose last byte is the sum of everything before it.
///
/// Returns the payload with the sum stripped, or `CorruptFrame` on mismatch.
/// A line shorter than two bytes cannot carry a sum and is malformed.
pub fn verify_suffixed<E>(line: &[u8]) -> Result<&[u8], ScipError<E>>
where
    E: core::fmt::Debug,
{
    if line.len() < 2 {
        return Err(ScipError::MalformedFrame("line too short for checksum"));
    }
    let (payload, sum) = line.split_at(line.len() - 1);
    let expected = sum[0];
    let calculated = checksum(payload);
    if calculated == expected {
        Ok(payload)
    } else {
        Err(ScipError::CorruptFrame { expected, calculated })
    }
}
