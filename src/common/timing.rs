// src/common/timing.rs

use core::time::Duration;

// Nominal values. Host-side serial stacks add their own buffering latency,
// so the exchange timeouts carry a generous margin over what the sensor
// itself needs.

// === Command/Response Timing ===

/// Quiet period between writing a command and reading its response. The
/// sensor drops response bytes that race the command on half-duplex USB
/// adapters, so every exchange waits this long after the flush.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Deadline for one complete command/response exchange, retries excluded.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_millis(500);

/// Retries after the first attempt of an exchange times out.
pub const DEFAULT_RETRIES: u8 = 2;

/// Once the first response byte arrived, the gap between consecutive bytes
/// must stay under this.
pub const INTER_BYTE_TIMEOUT: Duration = Duration::from_millis(20);

/// Deadline for the transport to accept one command's worth of bytes.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(50);

/// Deadline for a transmit-buffer flush.
pub const FLUSH_TIMEOUT: Duration = Duration::from_millis(20);

// === Byte Timing at 115200 Baud (8N1) ===
// 1 start bit + 8 data bits + 1 stop bit = 10 bits per byte.

/// Nominal duration of a single byte at the default baud rate.
pub const BYTE_DURATION: Duration = Duration::from_micros(87); // 10 / 115200 s

/// Baud rate the sensor powers up at.
pub const INITIAL_BAUD: u32 = 115_200;
