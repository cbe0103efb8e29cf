// src/common/line.rs

use super::checksum;
use super::error::ScipError;

/// Largest payload a single response line may carry before the sensor
/// inserts a sum byte and a line feed.
pub const MAX_PAYLOAD: usize = 64;

/// Largest line content (payload plus its sum byte), terminator excluded.
pub const MAX_CONTENT: usize = MAX_PAYLOAD + 1;

/// One response line with its terminator stripped.
///
/// A borrowed view; whether the content carries a trailing sum byte depends
/// on its position in the frame (status and data lines do, the echo does
/// not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseLine<'a> {
    content: &'a [u8],
}

impl<'a> ResponseLine<'a> {
    /// Decodes a raw line as received from the transport: strips the LF
    /// terminator (a preceding CR is tolerated) and enforces the length
    /// bound.
    pub fn decode<E>(raw: &'a [u8]) -> Result<Self, ScipError<E>>
    where
        E: core::fmt::Debug,
    {
        let content = raw
            .strip_suffix(b"\n")
            .ok_or(ScipError::MalformedFrame("missing line feed"))?;
        let content = content.strip_suffix(b"\r").unwrap_or(content);
        Self::from_content(content)
    }

    /// Wraps already-stripped line content, enforcing the length bound.
    pub fn from_content<E>(content: &'a [u8]) -> Result<Self, ScipError<E>>
    where
        E: core::fmt::Debug,
    {
        if content.len() > MAX_CONTENT {
            return Err(ScipError::LineTooLong {
                len: content.len(),
                max: MAX_CONTENT,
            });
        }
        Ok(ResponseLine { content })
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.content
    }

    /// A blank line terminates a frame.
    #[inline]
    pub fn is_terminator(&self) -> bool {
        self.content.is_empty()
    }

    /// Verifies the trailing sum byte and returns the payload before it.
    pub fn verify_sum<E>(&self) -> Result<&'a [u8], ScipError<E>>
    where
        E: core::fmt::Debug,
    {
        checksum::verify_suffixed(self.content)
    }
}
