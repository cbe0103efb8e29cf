// src/common/response.rs
//
// Typed views over decoded response frames. Everything here operates on
// already checksum-verified payloads.

use alloc::string::String;
use alloc::vec::Vec;

use super::encoding;
use super::error::ScipError;
use super::frame::ResponseFrame;

/// Identification block returned by the version command.
///
/// The sensor answers with exactly five `TAG:value;` lines; anything else
/// is treated as malformed rather than filled in partially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub vendor: String,
    pub product: String,
    pub firmware: String,
    pub protocol: String,
    pub serial: String,
}

impl VersionInfo {
    pub fn from_frame<E>(frame: &ResponseFrame) -> Result<Self, ScipError<E>>
    where
        E: core::fmt::Debug,
    {
        if frame.data.len() != 5 {
            return Err(ScipError::MalformedFrame(
                "version response must have five lines",
            ));
        }
        Ok(VersionInfo {
            vendor: field_value(&frame.data[0])?,
            product: field_value(&frame.data[1])?,
            firmware: field_value(&frame.data[2])?,
            protocol: field_value(&frame.data[3])?,
            serial: field_value(&frame.data[4])?,
        })
    }
}

/// Strips the `TAG:` prefix and trailing `;` some firmware wraps values in.
/// Bare values pass through unchanged.
fn field_value<E>(line: &[u8]) -> Result<String, ScipError<E>>
where
    E: core::fmt::Debug,
{
    let value = match line.iter().position(|&b| b == b':') {
        Some(colon) => &line[colon + 1..],
        None => line,
    };
    let value = value.strip_suffix(b";").unwrap_or(value);
    core::str::from_utf8(value)
        .map(String::from)
        .map_err(|_| ScipError::MalformedFrame("version line not utf-8"))
}

/// One decoded distance scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanData {
    /// Sensor-side timestamp in milliseconds, wrapping at 24 bits.
    pub timestamp: u32,
    /// Distances in millimetres, one per (possibly clustered) step.
    pub distances: Vec<u32>,
}

impl ScanData {
    /// Decodes a distance frame: the first data line is a four-character
    /// timestamp block, the remaining lines form one contiguous stream of
    /// three-character distance blocks.
    pub fn from_frame<E>(frame: &ResponseFrame) -> Result<Self, ScipError<E>>
    where
        E: core::fmt::Debug,
    {
        let (ts_line, rest) = frame
            .data
            .split_first()
            .ok_or(ScipError::MalformedFrame("distance response has no data"))?;
        if ts_line.len() != 4 {
            return Err(ScipError::MalformedFrame("timestamp must be four chars"));
        }
        let timestamp = encoding::decode_block(ts_line)?;

        let total: usize = rest.iter().map(Vec::len).sum();
        if total % 3 != 0 {
            return Err(ScipError::MalformedFrame(
                "distance data not a whole number of blocks",
            ));
        }
        let mut joined = Vec::with_capacity(total);
        for line in rest {
            joined.extend_from_slice(line);
        }
        let mut distances = Vec::with_capacity(total / 3);
        for block in joined.chunks_exact(3) {
            distances.push(encoding::decode_block(block)?);
        }
        Ok(ScanData { timestamp, distances })
    }
}
