// src/engine/io_helpers.rs

use super::ProtocolEngine;
use crate::common::{
    error::ScipError,
    hal_traits::{ScipInstant, ScipSerial, ScipTimer},
    line, timing,
};
use alloc::vec::Vec;
use core::fmt::Debug;
use core::time::Duration;
use nb::Result as NbResult;

/// Stale bytes drained before a command are capped; a transport that keeps
/// producing past this is broken rather than backlogged.
const DRAIN_CAP: usize = 4096;

impl<IF> ProtocolEngine<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a
    /// timeout error.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        mut f: FN,
    ) -> Result<T, ScipError<IF::Error>>
    where
        FN: FnMut(&mut IF) -> NbResult<T, IF::Error>,
    {
        let start_time = self.interface.now();
        let deadline = start_time + timeout;

        loop {
            match f(&mut self.interface) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if self.interface.now() >= deadline {
                        return Err(ScipError::Timeout);
                    }
                    // Small delay to avoid busy-spinning the transport.
                    self.interface.delay_us(100);
                }
                Err(nb::Error::Other(e)) => return Err(ScipError::Transport(e)),
            }
        }
    }

    /// Discards whatever the sensor sent since the last exchange.
    ///
    /// Only bytes already buffered are taken; the first `WouldBlock` ends
    /// the drain, so an idle line costs nothing.
    pub(super) fn drain_stale(&mut self) -> Result<usize, ScipError<IF::Error>> {
        let mut drained = 0;
        while drained < DRAIN_CAP {
            match self.interface.read_byte() {
                Ok(_) => drained += 1,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(ScipError::Transport(e)),
            }
        }
        if drained > 0 {
            log::debug!("drained {} stale bytes before command", drained);
        }
        Ok(drained)
    }

    /// Waits out the configured quiet period after flushing a command.
    /// Delays past `u32::MAX` milliseconds are clamped, not truncated.
    pub(super) fn settle(&mut self) {
        let ms = u32::try_from(self.config.settle_delay.as_millis()).unwrap_or(u32::MAX);
        self.interface.delay_ms(ms);
    }

    /// Sends already formatted command bytes and flushes the transport.
    /// Write failures are fatal to the whole exchange, not retried.
    pub(super) fn send_command_bytes(
        &mut self,
        cmd_bytes: &[u8],
    ) -> Result<(), ScipError<IF::Error>> {
        for byte in cmd_bytes {
            self.execute_blocking_io_with_timeout(timing::WRITE_TIMEOUT, |iface| {
                iface.write_byte(*byte)
            })?;
        }
        self.execute_blocking_io_with_timeout(timing::FLUSH_TIMEOUT, |iface| iface.flush())
    }

    /// Reads one LF-terminated line into `buf` (terminator and any CR
    /// stripped), bounded by `first_byte_timeout` for the first byte and
    /// the inter-byte timeout afterwards.
    pub(super) fn read_line(
        &mut self,
        first_byte_timeout: Duration,
        buf: &mut Vec<u8>,
    ) -> Result<(), ScipError<IF::Error>> {
        buf.clear();
        loop {
            let timeout = if buf.is_empty() {
                first_byte_timeout
            } else {
                timing::INTER_BYTE_TIMEOUT
            };

            match self.execute_blocking_io_with_timeout(timeout, |iface| iface.read_byte()) {
                Ok(b'\n') => {
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                    return Ok(());
                }
                Ok(byte) => {
                    if buf.len() >= line::MAX_CONTENT {
                        return Err(ScipError::LineTooLong {
                            len: buf.len() + 1,
                            max: line::MAX_CONTENT,
                        });
                    }
                    buf.push(byte);
                }
                Err(ScipError::Timeout) if !buf.is_empty() => {
                    // Bytes arrived but the line never completed.
                    return Err(ScipError::MalformedFrame("line truncated mid-flight"));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Best-effort drain of the rest of a frame after a corrupt or rejected
    /// line, so the next exchange starts on a frame boundary. Errors here
    /// are swallowed; the caller surfaces the original failure.
    pub(super) fn drain_to_terminator(&mut self) {
        let mut buf = Vec::new();
        for _ in 0..64 {
            match self.read_line(timing::INTER_BYTE_TIMEOUT, &mut buf) {
                Ok(()) if buf.is_empty() => return,
                Ok(()) => continue,
                Err(_) => return,
            }
        }
    }

    /// Time left until `deadline`, or a timeout error if it already passed.
    pub(super) fn remaining(
        &self,
        deadline: IF::Instant,
    ) -> Result<Duration, ScipError<IF::Error>> {
        let now = self.interface.now();
        if now >= deadline {
            Err(ScipError::Timeout)
        } else {
            Ok(deadline - now)
        }
    }
}
