// src/engine/stream.rs
//
// Measurement streaming. An MD command is acknowledged with an empty frame,
// after which the sensor pushes one data frame per delivered scan. Each
// pushed frame re-echoes the command with the remaining scan count patched
// in, so stream echoes are matched on the command code alone.

use super::{EngineState, ProtocolEngine};
use crate::common::{
    command::{codes, Command, StreamSpec},
    error::ScipError,
    frame::{ResponseFrame, Status},
    hal_traits::{ScipInstant, ScipSerial, ScipTimer},
    line::ResponseLine,
};
use alloc::vec::Vec;
use core::fmt::Debug;

impl<IF> ProtocolEngine<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    /// Starts a measurement stream. The acknowledgement frame must be empty;
    /// data starts arriving as separate pushed frames afterwards.
    pub fn start_stream(&mut self, spec: StreamSpec) -> Result<(), ScipError<IF::Error>> {
        let command = Command::MeasureDistance(spec);
        let ack = self.execute(&command)?;
        if !ack.data.is_empty() {
            self.drain_to_terminator();
            return Err(ScipError::MalformedFrame(
                "stream acknowledgement carried data",
            ));
        }
        self.stream_remaining = (spec.scans > 0).then_some(spec.scans);
        self.state = EngineState::Streaming;
        Ok(())
    }

    /// Reads the next pushed frame of a running stream.
    ///
    /// Finite streams flip back to `Idle` once the last requested frame has
    /// been delivered; calling this again afterwards is an illegal
    /// transition.
    pub fn next_frame(&mut self) -> Result<ResponseFrame, ScipError<IF::Error>> {
        if self.state != EngineState::Streaming {
            return Err(ScipError::IllegalTransition("no stream running"));
        }

        let deadline = self.interface.now() + self.config.exchange_timeout;
        let mut buf = Vec::new();

        let budget = self.remaining(deadline)?;
        self.read_line(budget, &mut buf)?;
        if !buf.starts_with(codes::MEASURE_DISTANCE) {
            let err = ScipError::MalformedFrame("stream echo has wrong command code");
            self.drain_to_terminator();
            return Err(err);
        }
        let echo = buf.clone();

        let budget = self.remaining(deadline)?;
        self.read_line(budget, &mut buf)?;
        let status = match ResponseLine::from_content(&buf).and_then(Status::parse) {
            Ok(status) => status,
            Err(e) => {
                // The frame's data lines are still on the wire; consume
                // them through the terminator so the next read starts on
                // a frame boundary.
                self.drain_to_terminator();
                return Err(e);
            }
        };
        // Pushed frames report "99"; "00" shows up on some firmware for the
        // final frame of a finite stream.
        if !status.is_ok() && !status.is_idempotent_ok() {
            self.drain_to_terminator();
            self.state = EngineState::Idle;
            self.stream_remaining = None;
            return Err(ScipError::SensorRejected(status));
        }

        let mut data = Vec::new();
        loop {
            let budget = self.remaining(deadline)?;
            self.read_line(budget, &mut buf)?;
            let line = ResponseLine::from_content(&buf)?;
            if line.is_terminator() {
                break;
            }
            match line.verify_sum() {
                Ok(payload) => data.push(payload.to_vec()),
                Err(e) => {
                    self.drain_to_terminator();
                    return Err(e);
                }
            }
        }

        if let Some(remaining) = self.stream_remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                log::debug!("finite stream complete");
                self.stream_remaining = None;
                self.state = EngineState::Idle;
            }
        }

        Ok(ResponseFrame { echo, status, data })
    }

    /// Cancels a running stream with QT and discards pushed frames until
    /// the sensor's acknowledgement arrives. Always leaves the engine idle.
    pub fn stop_stream(&mut self) -> Result<(), ScipError<IF::Error>> {
        if self.state != EngineState::Streaming {
            return Err(ScipError::IllegalTransition("no stream running"));
        }

        let result = self.cancel_stream();
        self.state = EngineState::Idle;
        self.stream_remaining = None;
        result
    }

    fn cancel_stream(&mut self) -> Result<(), ScipError<IF::Error>> {
        let wire = Command::LaserOff.format_into::<IF::Error>()?;
        self.send_command_bytes(wire.as_bytes())?;
        self.settle();

        // In-flight data frames may be interleaved ahead of the QT echo;
        // skip lines until it shows up. The budget covers several full
        // frames of backlog.
        let deadline = self.interface.now() + self.config.exchange_timeout * 4;
        let mut buf = Vec::new();
        loop {
            let budget = self.remaining(deadline)?;
            self.read_line(budget, &mut buf)?;
            if buf == codes::LASER_OFF {
                break;
            }
        }

        let budget = self.remaining(deadline)?;
        self.read_line(budget, &mut buf)?;
        let status = Status::parse(ResponseLine::from_content(&buf)?)?;
        if !status.is_ok() && !status.is_idempotent_ok() {
            return Err(ScipError::SensorRejected(status));
        }

        let budget = self.remaining(deadline)?;
        self.read_line(budget, &mut buf)?;
        if !buf.is_empty() {
            return Err(ScipError::MalformedFrame(
                "cancel acknowledgement not terminated",
            ));
        }
        log::debug!("stream cancelled");
        Ok(())
    }
}
