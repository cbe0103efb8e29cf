// src/engine/exchange.rs

use super::{EngineState, ProtocolEngine};
use crate::common::{
    command::Command,
    error::ScipError,
    frame::ResponseFrame,
    hal_traits::{ScipInstant, ScipSerial, ScipTimer},
};
use alloc::vec::Vec;
use core::fmt::Debug;
use core::time::Duration;

impl<IF> ProtocolEngine<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    /// Executes one full command/response exchange with the configured
    /// timeout and retry policy, returning the decoded frame.
    pub fn execute(&mut self, command: &Command) -> Result<ResponseFrame, ScipError<IF::Error>> {
        self.execute_with_timeout(command, self.config.exchange_timeout)
    }

    /// Like [`execute`](Self::execute), with a per-call attempt deadline.
    /// Timeouts are retried; everything else ends the exchange.
    pub fn execute_with_timeout(
        &mut self,
        command: &Command,
        timeout: Duration,
    ) -> Result<ResponseFrame, ScipError<IF::Error>> {
        self.require_idle()?;
        let wire = command.format_into()?;
        let expected_echo = command.encoded_echo::<IF::Error>()?;

        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                log::warn!(
                    "exchange attempt {}/{} for {}{}",
                    attempt + 1,
                    self.config.retries + 1,
                    command.code()[0] as char,
                    command.code()[1] as char,
                );
            }

            self.state = EngineState::Idle;
            self.drain_stale().map_err(|e| self.fail(e))?;

            self.state = EngineState::CommandSent;
            self.send_command_bytes(wire.as_bytes())
                .map_err(|e| self.fail(e))?;

            // The sensor needs a quiet period after the command before its
            // response is readable.
            self.settle();

            match self.read_frame(command, expected_echo.as_bytes(), timeout) {
                Ok(frame) => {
                    self.state = EngineState::Idle;
                    return Ok(frame);
                }
                Err(ScipError::Timeout) => {
                    self.state = EngineState::TimedOut;
                }
                Err(e) => return Err(self.fail(e)),
            }
        }

        log::error!("exchange gave up after {} attempts", self.config.retries + 1);
        Err(ScipError::Timeout)
    }

    /// Records a fatal exchange failure. The frame was already consumed
    /// through its terminator, so the transport stays frame-aligned.
    fn fail(&mut self, error: ScipError<IF::Error>) -> ScipError<IF::Error> {
        self.state = EngineState::Idle;
        error
    }

    /// Reads one complete response frame up to its blank terminator, then
    /// decodes it. Corruption and rejection therefore surface only after
    /// the whole frame left the wire.
    fn read_frame(
        &mut self,
        command: &Command,
        expected_echo: &[u8],
        timeout: Duration,
    ) -> Result<ResponseFrame, ScipError<IF::Error>> {
        let deadline = self.interface.now() + timeout;
        let mut lines: Vec<Vec<u8>> = Vec::new();
        let mut buf = Vec::new();

        loop {
            self.state = match lines.len() {
                0 => EngineState::AwaitingEcho,
                1 => EngineState::AwaitingStatus,
                _ => EngineState::AwaitingData,
            };
            let budget = self.remaining(deadline)?;
            self.read_line(budget, &mut buf)?;
            if buf.is_empty() {
                break;
            }
            lines.push(buf.clone());
        }

        let frame =
            ResponseFrame::decode(&lines, expected_echo, command.accepts_status_99());
        if let Err(ScipError::SensorRejected(status)) = &frame {
            log::warn!("sensor rejected {:?} with status {}", command.code(), status);
        }
        frame
    }
}
