// src/engine/mod.rs

mod exchange;
mod io_helpers;
mod stream;

use crate::common::{
    error::ScipError,
    hal_traits::{ScipInstant, ScipSerial, ScipTimer},
    timing,
};
use core::fmt::Debug;
use core::time::Duration;

/// Where the engine sits in the command/response cycle.
///
/// `execute` walks the receive states internally; between public calls the
/// engine is only ever `Idle`, `Streaming` or `TimedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No exchange in flight.
    Idle,
    /// Command bytes handed to the transport, flush pending or done.
    CommandSent,
    /// Waiting for the echo line.
    AwaitingEcho,
    /// Waiting for the status line.
    AwaitingStatus,
    /// Collecting data lines up to the blank terminator.
    AwaitingData,
    /// A measurement stream is running; only stream calls are legal.
    Streaming,
    /// The last attempt timed out; the next attempt (or the final error)
    /// resolves this.
    TimedOut,
}

/// Tunables for the exchange loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deadline for one attempt of a command/response exchange.
    pub exchange_timeout: Duration,
    /// Retries after the first attempt times out.
    pub retries: u8,
    /// Quiet period between flushing a command and reading its response.
    pub settle_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            exchange_timeout: timing::DEFAULT_EXCHANGE_TIMEOUT,
            retries: timing::DEFAULT_RETRIES,
            settle_delay: timing::SETTLE_DELAY,
        }
    }
}

/// Drives the SCIP2.0 command/response cycle over one serial interface.
///
/// The engine owns the transport and enforces the protocol state machine;
/// it knows nothing about sensor bookkeeping (laser state, scan mode),
/// which lives a layer up in [`crate::session::Session`].
#[derive(Debug)]
pub struct ProtocolEngine<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    pub(crate) interface: IF,
    pub(crate) config: EngineConfig,
    pub(crate) state: EngineState,
    /// Frames left in a finite stream; `None` while continuous or idle.
    pub(crate) stream_remaining: Option<u8>,
}

impl<IF> ProtocolEngine<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    pub fn new(interface: IF) -> Self {
        Self::with_config(interface, EngineConfig::default())
    }

    pub fn with_config(interface: IF, config: EngineConfig) -> Self {
        ProtocolEngine {
            interface,
            config,
            state: EngineState::Idle,
            stream_remaining: None,
        }
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.state == EngineState::Streaming
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the engine and hands the transport back.
    pub fn release(self) -> IF {
        self.interface
    }

    /// Checks that a new exchange may start.
    pub(crate) fn require_idle(&self) -> Result<(), ScipError<IF::Error>> {
        match self.state {
            EngineState::Idle | EngineState::TimedOut => Ok(()),
            EngineState::Streaming => Err(ScipError::IllegalTransition(
                "stream in progress, stop it first",
            )),
            _ => Err(ScipError::IllegalTransition("exchange already in flight")),
        }
    }
}
