// src/common/frame.rs

use super::checksum;
use super::error::ScipError;
use super::line::ResponseLine;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Two-digit status code from a response status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status([u8; 2]);

impl Status {
    pub const OK: Status = Status(*b"00");
    pub const ALREADY: Status = Status(*b"99");

    /// Parses a status line: two ASCII digits, optionally followed by a sum
    /// byte over them. A bare two-byte line is accepted because early
    /// firmware omits the sum.
    pub fn parse<E>(line: ResponseLine<'_>) -> Result<Self, ScipError<E>>
    where
        E: core::fmt::Debug,
    {
        let content = line.as_bytes();
        let digits: &[u8] = match content.len() {
            2 => content,
            3 => checksum::verify_suffixed(content)?,
            _ => return Err(ScipError::MalformedFrame("status line must be 2-3 bytes")),
        };
        if digits.len() != 2 || !digits.iter().all(u8::is_ascii_digit) {
            return Err(ScipError::MalformedFrame("status must be two digits"));
        }
        Ok(Status([digits[0], digits[1]]))
    }

    /// Plain success.
    #[inline]
    pub fn is_ok(&self) -> bool {
        *self == Status::OK
    }

    /// "Already in the requested state", reported by laser switching and by
    /// data frames of a running stream. Success for idempotent commands.
    #[inline]
    pub fn is_idempotent_ok(&self) -> bool {
        *self == Status::ALREADY
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

/// A fully decoded response frame: echo line, status, and the verified
/// payloads of the data lines up to the blank terminator.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub echo: Vec<u8>,
    pub status: Status,
    pub data: Vec<Vec<u8>>,
}

#[cfg(feature = "alloc")]
impl ResponseFrame {
    /// Validates and assembles a frame from its received lines, the blank
    /// terminator excluded: line 1 is the echo and must match the sent
    /// command, line 2 the status, the rest checksummed data payloads.
    ///
    /// `accept_99` admits the "already in the requested state" status for
    /// idempotent command classes.
    pub fn decode<E>(
        lines: &[Vec<u8>],
        expected_echo: &[u8],
        accept_99: bool,
    ) -> Result<Self, ScipError<E>>
    where
        E: core::fmt::Debug,
    {
        let (echo, rest) = lines
            .split_first()
            .ok_or(ScipError::MalformedFrame("frame has no echo line"))?;
        if echo.as_slice() != expected_echo {
            return Err(ScipError::MalformedFrame("echo does not match command"));
        }

        let (status_line, data_lines) = rest
            .split_first()
            .ok_or(ScipError::MalformedFrame("frame has no status line"))?;
        let status = Status::parse(ResponseLine::from_content(status_line)?)?;
        if !status.is_ok() && !(accept_99 && status.is_idempotent_ok()) {
            return Err(ScipError::SensorRejected(status));
        }

        let mut data = Vec::with_capacity(data_lines.len());
        for line in data_lines {
            let payload = ResponseLine::from_content(line)?.verify_sum()?;
            data.push(payload.to_vec());
        }

        Ok(ResponseFrame {
            echo: echo.clone(),
            status,
            data,
        })
    }

    /// Concatenates the data line payloads into one contiguous buffer.
    ///
    /// The sensor splits payloads at 64-byte boundaries without regard to
    /// block boundaries, so decoding has to happen on the joined stream.
    pub fn joined_data(&self) -> Vec<u8> {
        let total: usize = self.data.iter().map(Vec::len).sum();
        let mut joined = Vec::with_capacity(total);
        for line in &self.data {
            joined.extend_from_slice(line);
        }
        joined
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockIoError;

    fn line(content: &[u8]) -> ResponseLine<'_> {
        ResponseLine::from_content::<MockIoError>(content).unwrap()
    }

    #[test]
    fn parses_bare_status() {
        let status = Status::parse::<MockIoError>(line(b"00")).unwrap();
        assert!(status.is_ok());
        assert!(!status.is_idempotent_ok());
    }

    #[test]
    fn parses_checksummed_status() {
        // checksum(b"00") = 0x30 + ((0x30 + 0x30) & 0x3f) = 0x50 = 'P'
        let status = Status::parse::<MockIoError>(line(b"00P")).unwrap();
        assert!(status.is_ok());

        // checksum(b"99") = 'b'
        let status = Status::parse::<MockIoError>(line(b"99b")).unwrap();
        assert!(status.is_idempotent_ok());
    }

    #[test]
    fn rejects_corrupt_status_sum() {
        assert!(matches!(
            Status::parse::<MockIoError>(line(b"00Q")),
            Err(ScipError::CorruptFrame { .. })
        ));
    }

    #[test]
    fn rejects_non_digit_status() {
        assert!(matches!(
            Status::parse::<MockIoError>(line(b"0x")),
            Err(ScipError::MalformedFrame(_))
        ));
        assert!(matches!(
            Status::parse::<MockIoError>(line(b"")),
            Err(ScipError::MalformedFrame(_))
        ));
        assert!(matches!(
            Status::parse::<MockIoError>(line(b"0000")),
            Err(ScipError::MalformedFrame(_))
        ));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn status_displays_as_digits() {
        let status = Status::parse::<MockIoError>(line(b"21")).unwrap();
        assert_eq!(alloc::format!("{}", status), "21");
        assert!(!status.is_ok());
    }

    #[cfg(feature = "alloc")]
    mod decode {
        use super::*;
        use crate::common::checksum;
        use alloc::vec;
        use alloc::vec::Vec;

        fn sum_line(payload: &[u8]) -> Vec<u8> {
            let mut line = payload.to_vec();
            line.push(checksum::checksum(payload));
            line
        }

        #[test]
        fn assembles_valid_frame() {
            let lines = vec![b"VV".to_vec(), sum_line(b"00"), sum_line(b"FIRM:3.4.03;")];
            let frame =
                ResponseFrame::decode::<MockIoError>(&lines, b"VV", false).unwrap();
            assert_eq!(frame.echo, b"VV");
            assert!(frame.status.is_ok());
            assert_eq!(frame.data, vec![b"FIRM:3.4.03;".to_vec()]);
        }

        #[test]
        fn empty_frame_is_malformed() {
            let result = ResponseFrame::decode::<MockIoError>(&[], b"VV", false);
            assert!(matches!(result, Err(ScipError::MalformedFrame(_))));
        }

        #[test]
        fn missing_status_is_malformed() {
            let lines = vec![b"VV".to_vec()];
            let result = ResponseFrame::decode::<MockIoError>(&lines, b"VV", false);
            assert!(matches!(result, Err(ScipError::MalformedFrame(_))));
        }

        #[test]
        fn echo_mismatch_is_malformed() {
            let lines = vec![b"PP".to_vec(), sum_line(b"00")];
            let result = ResponseFrame::decode::<MockIoError>(&lines, b"VV", false);
            assert!(matches!(result, Err(ScipError::MalformedFrame(_))));
        }

        #[test]
        fn rejection_depends_on_accept_99() {
            let lines = vec![b"QT".to_vec(), sum_line(b"99")];
            assert!(matches!(
                ResponseFrame::decode::<MockIoError>(&lines, b"QT", false),
                Err(ScipError::SensorRejected(_))
            ));
            let frame =
                ResponseFrame::decode::<MockIoError>(&lines, b"QT", true).unwrap();
            assert!(frame.status.is_idempotent_ok());
        }

        #[test]
        fn corrupt_data_line_fails() {
            let lines = vec![b"VV".to_vec(), sum_line(b"00"), b"dataX".to_vec()];
            let result = ResponseFrame::decode::<MockIoError>(&lines, b"VV", false);
            assert!(matches!(result, Err(ScipError::CorruptFrame { .. })));
        }
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn joined_data_concatenates_lines() {
        let frame = ResponseFrame {
            echo: b"GD0000000100".to_vec(),
            status: Status::OK,
            data: alloc::vec![b"abc".to_vec(), b"def".to_vec()],
        };
        assert_eq!(frame.joined_data(), b"abcdef");
    }
}
