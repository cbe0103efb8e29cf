// src/common/error.rs

use super::frame::Status;

/// Protocol and transport errors, generic over the underlying I/O error type
/// supplied by the transport implementation.
#[derive(Debug, thiserror::Error)]
pub enum ScipError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O failure reported by the transport. Fatal to the
    /// current exchange; the session is reusable after a reopen.
    #[error("transport error: {0:?}")]
    Transport(E),

    /// No complete response arrived before the deadline, including after
    /// all retries of a command/response exchange.
    #[error("exchange timed out")]
    Timeout,

    /// A checksummed line failed verification. The frame is still drained
    /// to its terminator before this is surfaced.
    #[error("checksum mismatch: expected {expected:#04x}, calculated {calculated:#04x}")]
    CorruptFrame { expected: u8, calculated: u8 },

    /// The response did not have the expected shape (echo mismatch, bad
    /// status line, missing terminator, ...).
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// A response line exceeded the payload bound before a checksum byte
    /// was seen.
    #[error("response line too long: {len} bytes, max {max}")]
    LineTooLong { len: usize, max: usize },

    /// The sensor answered with a non-success status code.
    #[error("sensor rejected command with status {0}")]
    SensorRejected(Status),

    /// A command parameter failed validation before any I/O took place.
    #[error("invalid command parameter")]
    InvalidParameter,

    /// The requested operation is not legal in the current state
    /// (e.g. starting a scan while one is already running).
    #[error("illegal transition: {0}")]
    IllegalTransition(&'static str),
}

// Allow mapping from the underlying transport error.
impl<E: core::fmt::Debug> From<E> for ScipError<E> {
    fn from(e: E) -> Self {
        ScipError::Transport(e)
    }
}
