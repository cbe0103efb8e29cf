// src/common/command.rs

use arrayvec::ArrayString;
use core::fmt::Write;

use super::error::ScipError;

/// Longest parameter block a command may carry.
pub const MAX_PARAM_LEN: usize = 14;

/// Two code characters, up to fourteen parameter characters, one line feed.
pub const MAX_COMMAND_LEN: usize = 2 + MAX_PARAM_LEN + 1;

pub mod codes {
    pub const LASER_ON: &[u8; 2] = b"BM";
    pub const LASER_OFF: &[u8; 2] = b"QT";
    pub const RESET: &[u8; 2] = b"RS";
    pub const SET_TIMESTAMP: &[u8; 2] = b"TM";
    pub const SET_BAUD: &[u8; 2] = b"SS";
    pub const SET_MOTOR: &[u8; 2] = b"CR";
    pub const SET_SENSITIVITY: &[u8; 2] = b"HS";
    pub const SET_MALFUNCTION: &[u8; 2] = b"DB";
    pub const VERSION: &[u8; 2] = b"VV";
    pub const PARAMETERS: &[u8; 2] = b"PP";
    pub const STATE: &[u8; 2] = b"II";
    pub const MEASURE_SPECIAL: &[u8; 2] = b"MS";
    pub const MEASURE_DISTANCE: &[u8; 2] = b"MD";
    pub const GET_DISTANCE: &[u8; 2] = b"GS";
    pub const GET_DISTANCE_HIGH: &[u8; 2] = b"GD";
}

/// Step range and grouping for a distance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    /// First measurement step, 0..=9999.
    pub start: u16,
    /// Last measurement step, 0..=9999, at or after `start`.
    pub end: u16,
    /// Number of neighbouring steps merged into one reading, 0..=99.
    pub cluster: u8,
}

impl ScanRange {
    pub fn new(start: u16, end: u16, cluster: u8) -> Self {
        ScanRange { start, end, cluster }
    }

    fn validate<E: core::fmt::Debug>(&self) -> Result<(), ScipError<E>> {
        if self.start > 9999 || self.end > 9999 || self.start > self.end || self.cluster > 99 {
            return Err(ScipError::InvalidParameter);
        }
        Ok(())
    }
}

/// Range plus cadence for a streamed (MD) measurement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub range: ScanRange,
    /// Scans skipped between delivered frames, 0..=9.
    pub interval: u8,
    /// Number of frames to deliver; 0 streams until cancelled.
    pub scans: u8,
}

impl StreamSpec {
    pub fn new(range: ScanRange, interval: u8, scans: u8) -> Self {
        StreamSpec { range, interval, scans }
    }

    /// A single-shot stream delivers exactly one frame.
    pub fn single_shot(range: ScanRange) -> Self {
        StreamSpec { range, interval: 0, scans: 1 }
    }

    fn validate<E: core::fmt::Debug>(&self) -> Result<(), ScipError<E>> {
        self.range.validate()?;
        if self.interval > 9 || self.scans > 99 {
            return Err(ScipError::InvalidParameter);
        }
        Ok(())
    }
}

/// An outgoing SCIP2.0 command.
///
/// Only the commands the driver actually issues get structured variants;
/// everything else in the vocabulary goes through [`Command::raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// VV: firmware and vendor identification.
    Version,
    /// BM: switch the laser on.
    LaserOn,
    /// QT: switch the laser off (also cancels a running stream).
    LaserOff,
    /// RS: reset to power-on defaults.
    Reset,
    /// GD: one high-resolution distance snapshot.
    GetDistance(ScanRange),
    /// MD: streamed distance measurement.
    MeasureDistance(StreamSpec),
    /// Escape hatch for vocabulary not covered by a structured variant.
    Raw {
        code: [u8; 2],
        param: ArrayString<MAX_PARAM_LEN>,
    },
}

impl Command {
    /// Builds a raw command after validating the code and parameter charset.
    pub fn raw<E: core::fmt::Debug>(code: [u8; 2], param: &str) -> Result<Self, ScipError<E>> {
        if !code.iter().all(u8::is_ascii_uppercase) {
            return Err(ScipError::InvalidParameter);
        }
        if param.len() > MAX_PARAM_LEN
            || !param.bytes().all(|b| b.is_ascii_graphic() || b == b' ')
        {
            return Err(ScipError::InvalidParameter);
        }
        let mut buf = ArrayString::new();
        buf.push_str(param);
        Ok(Command::Raw { code, param: buf })
    }

    /// The two-character command code.
    pub fn code(&self) -> &[u8; 2] {
        match self {
            Command::Version => codes::VERSION,
            Command::LaserOn => codes::LASER_ON,
            Command::LaserOff => codes::LASER_OFF,
            Command::Reset => codes::RESET,
            Command::GetDistance(_) => codes::GET_DISTANCE_HIGH,
            Command::MeasureDistance(_) => codes::MEASURE_DISTANCE,
            Command::Raw { code, .. } => code,
        }
    }

    /// Whether a "99" status is an acceptable success for this command.
    ///
    /// Laser switching reports "99" when the laser is already in the
    /// requested state; treating that as success makes the operations
    /// idempotent.
    pub fn accepts_status_99(&self) -> bool {
        matches!(self, Command::LaserOn | Command::LaserOff)
    }

    /// Formats the command into its wire form, trailing LF included.
    pub fn format_into<E: core::fmt::Debug>(
        &self,
    ) -> Result<ArrayString<MAX_COMMAND_LEN>, ScipError<E>> {
        let mut buf = ArrayString::<MAX_COMMAND_LEN>::new();
        let code = self.code();
        buf.push(code[0] as char);
        buf.push(code[1] as char);
        match self {
            Command::Version
            | Command::LaserOn
            | Command::LaserOff
            | Command::Reset => {}
            Command::GetDistance(range) => {
                range.validate()?;
                write!(buf, "{:04}{:04}{:02}", range.start, range.end, range.cluster)
                    .map_err(|_| ScipError::InvalidParameter)?;
            }
            Command::MeasureDistance(spec) => {
                spec.validate()?;
                let r = &spec.range;
                write!(
                    buf,
                    "{:04}{:04}{:02}{:01}{:02}",
                    r.start, r.end, r.cluster, spec.interval, spec.scans
                )
                .map_err(|_| ScipError::InvalidParameter)?;
            }
            Command::Raw { param, .. } => {
                buf.try_push_str(param)
                    .map_err(|_| ScipError::InvalidParameter)?;
            }
        }
        buf.push('\n');
        Ok(buf)
    }

    /// The echo line the sensor sends back: the command without its LF.
    pub fn encoded_echo<E: core::fmt::Debug>(
        &self,
    ) -> Result<ArrayString<MAX_COMMAND_LEN>, ScipError<E>> {
        let mut echo = self.format_into()?;
        echo.pop();
        Ok(echo)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockIoError;

    type R<T> = Result<T, ScipError<MockIoError>>;

    #[test]
    fn parameterless_commands() {
        let vv: R<_> = Command::Version.format_into();
        assert_eq!(vv.unwrap().as_str(), "VV\n");
        let bm: R<_> = Command::LaserOn.format_into();
        assert_eq!(bm.unwrap().as_str(), "BM\n");
        let qt: R<_> = Command::LaserOff.format_into();
        assert_eq!(qt.unwrap().as_str(), "QT\n");
        let rs: R<_> = Command::Reset.format_into();
        assert_eq!(rs.unwrap().as_str(), "RS\n");
    }

    #[test]
    fn get_distance_parameter_layout() {
        let cmd = Command::GetDistance(ScanRange::new(44, 725, 1));
        let wire: R<_> = cmd.format_into();
        assert_eq!(wire.unwrap().as_str(), "GD0044072501\n");
    }

    #[test]
    fn measure_distance_parameter_layout() {
        let cmd = Command::MeasureDistance(StreamSpec::new(ScanRange::new(44, 725, 1), 0, 0));
        let wire: R<_> = cmd.format_into();
        assert_eq!(wire.unwrap().as_str(), "MD0044072501000\n");
    }

    #[test]
    fn single_shot_requests_one_scan() {
        let cmd = Command::MeasureDistance(StreamSpec::single_shot(ScanRange::new(0, 768, 0)));
        let wire: R<_> = cmd.format_into();
        assert_eq!(wire.unwrap().as_str(), "MD0000076800001\n");
    }

    #[test]
    fn echo_is_wire_form_without_lf() {
        let cmd = Command::GetDistance(ScanRange::new(44, 725, 1));
        let echo: R<_> = cmd.encoded_echo();
        assert_eq!(echo.unwrap().as_str(), "GD0044072501");
    }

    #[test]
    fn range_validation() {
        let cmd = Command::GetDistance(ScanRange::new(10_000, 10_001, 0));
        let r: R<_> = cmd.format_into();
        assert!(matches!(r, Err(ScipError::InvalidParameter)));

        let cmd = Command::GetDistance(ScanRange::new(100, 50, 0));
        let r: R<_> = cmd.format_into();
        assert!(matches!(r, Err(ScipError::InvalidParameter)));

        let cmd = Command::GetDistance(ScanRange::new(0, 100, 100));
        let r: R<_> = cmd.format_into();
        assert!(matches!(r, Err(ScipError::InvalidParameter)));
    }

    #[test]
    fn stream_validation() {
        let cmd =
            Command::MeasureDistance(StreamSpec::new(ScanRange::new(0, 100, 0), 10, 0));
        let r: R<_> = cmd.format_into();
        assert!(matches!(r, Err(ScipError::InvalidParameter)));
    }

    #[test]
    fn raw_command_charset_and_length() {
        let cmd: R<_> = Command::raw(*codes::SET_BAUD, "019200");
        let wire: R<_> = cmd.unwrap().format_into();
        assert_eq!(wire.unwrap().as_str(), "SS019200\n");

        let too_long: R<_> = Command::raw(*codes::SET_BAUD, "012345678901234");
        assert!(matches!(too_long, Err(ScipError::InvalidParameter)));

        let bad_charset: R<_> = Command::raw(*codes::SET_BAUD, "01\n92");
        assert!(matches!(bad_charset, Err(ScipError::InvalidParameter)));

        let bad_code: R<_> = Command::raw([b'v', b'v'], "");
        assert!(matches!(bad_code, Err(ScipError::InvalidParameter)));
    }

    #[test]
    fn status_99_accepted_only_for_laser_switching() {
        assert!(Command::LaserOn.accepts_status_99());
        assert!(Command::LaserOff.accepts_status_99());
        assert!(!Command::Version.accepts_status_99());
        assert!(!Command::GetDistance(ScanRange::new(0, 1, 0)).accepts_status_99());
    }
}
