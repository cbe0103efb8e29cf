// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod checksum;
pub mod command;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod line;
#[cfg(feature = "alloc")]
pub mod response;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

// From checksum.rs
pub use checksum::{checksum, verify, verify_suffixed};

// From command.rs
pub use command::{Command, ScanRange, StreamSpec};

// From encoding.rs
pub use encoding::decode_block;

// From error.rs
pub use error::ScipError;

// From frame.rs
pub use frame::Status;

// From hal_traits.rs
pub use hal_traits::{ScipInstant, ScipSerial, ScipTimer};

// From line.rs
pub use line::ResponseLine;

// From timing.rs (constants - users can access via common::timing::*)

// --- Feature-gated re-exports ---

#[cfg(feature = "alloc")]
pub use frame::ResponseFrame;
#[cfg(feature = "alloc")]
pub use response::{ScanData, VersionInfo};
