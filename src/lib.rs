// src/lib.rs

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod common;
#[cfg(feature = "alloc")]
pub mod engine;
#[cfg(feature = "alloc")]
pub mod session;

// Re-export key types for convenience
pub use common::{Command, ScanRange, ScipError, ScipSerial, ScipTimer, Status, StreamSpec};
#[cfg(feature = "alloc")]
pub use common::{ResponseFrame, ScanData, VersionInfo};
#[cfg(feature = "alloc")]
pub use engine::{EngineConfig, EngineState, ProtocolEngine};
#[cfg(feature = "alloc")]
pub use session::{ScanMode, SensorId, SensorRegistry, SensorState, Session};
