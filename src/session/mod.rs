// src/session/mod.rs

pub mod registry;

pub use registry::{SensorId, SensorRegistry};

use crate::common::{
    command::{Command, ScanRange, StreamSpec},
    error::ScipError,
    hal_traits::{ScipInstant, ScipSerial, ScipTimer},
    response::{ScanData, VersionInfo},
};
use crate::engine::{EngineConfig, ProtocolEngine};
use core::fmt::Debug;

/// What the sensor is currently doing with its scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Idle,
    /// A continuous stream is running until cancelled.
    Continuous,
    /// A finite stream is running and ends on its own.
    SingleShot,
}

/// Book-kept sensor state, tracked locally from accepted commands.
///
/// There is no connected flag: a [`Session`] exists only while its transport
/// is open, and [`Session::close`] consumes it, so connection liveness is
/// carried by the session value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorState {
    pub laser_on: bool,
    pub scan_mode: ScanMode,
}

/// A live connection to one rangefinder.
///
/// Wraps a [`ProtocolEngine`] with the sensor-level bookkeeping the
/// protocol itself does not carry: laser state and scan mode. Closing the
/// session consumes it and returns the transport, so a closed session
/// cannot be used again by construction.
#[derive(Debug)]
pub struct Session<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    engine: ProtocolEngine<IF>,
    state: SensorState,
}

impl<IF> Session<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    /// Opens a session over a connected transport.
    pub fn open(interface: IF) -> Self {
        Self::open_with_config(interface, EngineConfig::default())
    }

    pub fn open_with_config(interface: IF, config: EngineConfig) -> Self {
        log::info!("session opened");
        Session {
            engine: ProtocolEngine::with_config(interface, config),
            state: SensorState::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Queries the identification block (vendor, product, firmware,
    /// protocol revision, serial number).
    pub fn get_version(&mut self) -> Result<VersionInfo, ScipError<IF::Error>> {
        let frame = self.engine.execute(&Command::Version)?;
        VersionInfo::from_frame(&frame)
    }

    /// Switches the laser on or off. Idempotent: the sensor reporting the
    /// laser already in the requested state counts as success.
    ///
    /// Local laser state is only updated once the sensor accepted the
    /// command.
    pub fn set_laser(&mut self, on: bool) -> Result<(), ScipError<IF::Error>> {
        let command = if on { Command::LaserOn } else { Command::LaserOff };
        self.engine.execute(&command)?;
        self.state.laser_on = on;
        log::debug!("laser {}", if on { "on" } else { "off" });
        Ok(())
    }

    /// Takes one distance snapshot. Requires the laser to be on; the
    /// sensor rejects the request otherwise.
    pub fn get_distance(&mut self, range: ScanRange) -> Result<ScanData, ScipError<IF::Error>> {
        let frame = self.engine.execute(&Command::GetDistance(range))?;
        ScanData::from_frame(&frame)
    }

    /// Starts a measurement stream; `scans == 0` runs until stopped.
    /// Starting while a scan is already running is an illegal transition
    /// and performs no I/O.
    pub fn start_scan(&mut self, spec: StreamSpec) -> Result<(), ScipError<IF::Error>> {
        if self.state.scan_mode != ScanMode::Idle {
            return Err(ScipError::IllegalTransition("scan already running"));
        }
        self.engine.start_stream(spec)?;
        self.state.scan_mode = if spec.scans == 0 {
            ScanMode::Continuous
        } else {
            ScanMode::SingleShot
        };
        // MD implies the laser; the sensor switches it on itself.
        self.state.laser_on = true;
        Ok(())
    }

    /// Reads the next scan of a running stream. A finished single-shot
    /// stream resets the scan mode automatically.
    pub fn read_scan(&mut self) -> Result<ScanData, ScipError<IF::Error>> {
        if self.state.scan_mode == ScanMode::Idle {
            return Err(ScipError::IllegalTransition("no scan running"));
        }
        let frame = self.engine.next_frame()?;
        if !self.engine.is_streaming() {
            self.state.scan_mode = ScanMode::Idle;
            self.state.laser_on = false;
        }
        ScanData::from_frame(&frame)
    }

    /// Stops a running scan. A silent no-op when no scan is running, so
    /// shutdown paths can call it unconditionally.
    pub fn stop_scan(&mut self) -> Result<(), ScipError<IF::Error>> {
        if self.state.scan_mode == ScanMode::Idle {
            return Ok(());
        }
        let result = self.engine.stop_stream();
        // QT also switched the laser off, whatever the drain outcome.
        self.state.scan_mode = ScanMode::Idle;
        self.state.laser_on = false;
        result
    }

    /// Closes the session, stopping any running scan and switching the
    /// laser off on a best-effort basis, and returns the transport.
    pub fn close(mut self) -> IF {
        if self.state.scan_mode != ScanMode::Idle {
            if let Err(e) = self.stop_scan() {
                log::warn!("scan not stopped cleanly on close: {}", e);
            }
        } else if self.state.laser_on {
            if let Err(e) = self.set_laser(false) {
                log::warn!("laser not switched off on close: {}", e);
            }
        }
        log::info!("session closed");
        self.engine.release()
    }

    /// Resets the sensor to its power-on defaults: laser off, streaming
    /// stopped, baud back to the initial rate.
    pub fn reset(&mut self) -> Result<(), ScipError<IF::Error>> {
        if self.state.scan_mode != ScanMode::Idle {
            self.stop_scan()?;
        }
        self.engine.execute(&Command::Reset)?;
        self.state = SensorState::default();
        Ok(())
    }

    /// Escape hatch for protocol commands without a dedicated method.
    pub fn execute_raw(
        &mut self,
        command: &Command,
    ) -> Result<crate::common::frame::ResponseFrame, ScipError<IF::Error>> {
        self.engine.execute(command)
    }
}
