//! Line-based screen-art commands, for hosts that talk over a plain terminal.
//!
//! Each command is one ASCII line ending in `\n` (a trailing `\r` is ignored):
//! - `TEST` starts the local test pattern
//! - `SCREEN:v0,v1,...,v63` sets all 64 cells in row-major order; only the
//!   low nibble of each decimal value is kept
//!
//! [`ScreenDecoder`] accepts both this and the binary [`FrameParser`] format
//! on the same link. A byte of `0xAA` while neither parser is mid-message
//! starts a binary frame; anything else starts a text line.

use heapless::Vec;

use crate::frame::{FrameError, FrameParser, PixelFrame, FRAME_HEADER, PIXEL_COUNT};

/// Longest accepted line: the prefix plus three digits and a comma per cell
pub const MAX_LINE: usize = SCREEN_PREFIX.len() + PIXEL_COUNT * 4;

const SCREEN_PREFIX: &[u8] = b"SCREEN:";
const TEST_COMMAND: &[u8] = b"TEST";

/// A complete command from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenCommand {
    /// Draw this frame
    Frame(PixelFrame),
    /// Start the local test pattern
    TestPattern,
}

/// Errors from a text line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line longer than [`MAX_LINE`]; it is discarded up to the next newline
    TooLong,
    /// Line is neither `TEST` nor `SCREEN:`
    UnknownCommand,
    /// `SCREEN:` line with fewer or more than 64 values
    WrongCount(usize),
    /// A value that is not a decimal number
    BadValue(usize),
}

/// Accumulates bytes into lines and parses each completed line
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    line: Vec<u8, MAX_LINE>,
    overflowed: bool,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no partial line is buffered
    pub fn is_idle(&self) -> bool {
        self.line.is_empty() && !self.overflowed
    }

    pub fn reset(&mut self) {
        self.line.clear();
        self.overflowed = false;
    }

    /// Feed one byte
    ///
    /// Returns a command when `byte` completes a non-empty line.
    pub fn feed(&mut self, byte: u8) -> Result<Option<ScreenCommand>, LineError> {
        if byte != b'\n' {
            if self.line.push(byte).is_err() {
                self.overflowed = true;
            }
            return Ok(None);
        }

        let result = if self.overflowed {
            Err(LineError::TooLong)
        } else {
            parse_line(&self.line)
        };
        self.reset();
        result
    }
}

/// Parse one line without its terminating newline
///
/// Blank lines yield `Ok(None)`.
pub fn parse_line(line: &[u8]) -> Result<Option<ScreenCommand>, LineError> {
    let line = trim(line);
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with(TEST_COMMAND) {
        return Ok(Some(ScreenCommand::TestPattern));
    }
    let Some(payload) = line.strip_prefix(SCREEN_PREFIX) else {
        return Err(LineError::UnknownCommand);
    };

    let mut cells = [0u8; PIXEL_COUNT];
    let mut count = 0;
    for field in payload.split(|&b| b == b',') {
        if count == PIXEL_COUNT {
            return Err(LineError::WrongCount(count + 1));
        }
        cells[count] = parse_value(trim(field)).ok_or(LineError::BadValue(count))?;
        count += 1;
    }
    if count != PIXEL_COUNT {
        return Err(LineError::WrongCount(count));
    }

    Ok(Some(ScreenCommand::Frame(PixelFrame::from_cells(&cells))))
}

/// Decimal value reduced to its low nibble
fn parse_value(field: &[u8]) -> Option<u8> {
    if field.is_empty() {
        return None;
    }
    let mut nibble = 0u8;
    for &b in field {
        if !b.is_ascii_digit() {
            return None;
        }
        // Only the low nibble survives, and 10 * n mod 16 depends only on n mod 16
        nibble = (nibble.wrapping_mul(10).wrapping_add(b - b'0')) & 0x0F;
    }
    Some(nibble)
}

fn trim(mut s: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = s {
        if !first.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    while let [rest @ .., last] = s {
        if !last.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    s
}

/// Errors from either wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenError {
    Frame(FrameError),
    Line(LineError),
}

impl From<FrameError> for ScreenError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

impl From<LineError> for ScreenError {
    fn from(e: LineError) -> Self {
        Self::Line(e)
    }
}

/// Routes incoming bytes to the binary or text parser
#[derive(Debug, Clone, Default)]
pub struct ScreenDecoder {
    frames: FrameParser,
    lines: LineParser,
}

impl ScreenDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.frames.reset();
        self.lines.reset();
    }

    pub fn feed(&mut self, byte: u8) -> Result<Option<ScreenCommand>, ScreenError> {
        if !self.frames.is_idle() {
            return Ok(self.frames.feed(byte)?.map(ScreenCommand::Frame));
        }
        if byte == FRAME_HEADER && self.lines.is_idle() {
            return Ok(self.frames.feed(byte)?.map(ScreenCommand::Frame));
        }
        Ok(self.lines.feed(byte)?)
    }

    /// Feed bytes until the first complete command
    ///
    /// Remaining bytes after it are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<ScreenCommand>, ScreenError> {
        for &byte in bytes {
            if let Some(cmd) = self.feed(byte)? {
                return Ok(Some(cmd));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FRAME_SIZE;
    use core::fmt::Write;

    fn screen_line(values: impl Iterator<Item = u32>) -> heapless::String<512> {
        let mut s = heapless::String::new();
        s.push_str("SCREEN:").unwrap();
        for (i, v) in values.enumerate() {
            if i > 0 {
                s.push(',').unwrap();
            }
            write!(s, "{}", v).unwrap();
        }
        s.push('\n').unwrap();
        s
    }

    fn feed_all(parser: &mut LineParser, bytes: &[u8]) -> Result<Option<ScreenCommand>, LineError> {
        let mut last = Ok(None);
        for &b in bytes {
            last = parser.feed(b);
            if !matches!(last, Ok(None)) {
                return last;
            }
        }
        last
    }

    #[test]
    fn test_full_screen_line() {
        let line = screen_line((0..64).map(|i| i % 16));
        let mut parser = LineParser::new();
        let Ok(Some(ScreenCommand::Frame(frame))) = feed_all(&mut parser, line.as_bytes()) else {
            panic!("expected a frame");
        };

        assert_eq!(frame.get(0, 0), Some(0));
        assert_eq!(frame.get(1, 0), Some(1));
        assert_eq!(frame.get(7, 1), Some(15));
        assert_eq!(frame.get(7, 7), Some(15));
        assert!(parser.is_idle());
    }

    #[test]
    fn test_values_keep_low_nibble() {
        let line = screen_line([17u32, 255, 1000].into_iter().chain(core::iter::repeat(0).take(61)));
        let mut parser = LineParser::new();
        let Ok(Some(ScreenCommand::Frame(frame))) = feed_all(&mut parser, line.as_bytes()) else {
            panic!("expected a frame");
        };
        assert_eq!(frame.get(0, 0), Some(1));
        assert_eq!(frame.get(1, 0), Some(15));
        assert_eq!(frame.get(2, 0), Some(8));
    }

    #[test]
    fn test_short_screen_line() {
        let line = screen_line(0..10);
        let mut parser = LineParser::new();
        assert_eq!(
            feed_all(&mut parser, line.as_bytes()),
            Err(LineError::WrongCount(10))
        );
        // Next line parses normally
        assert_eq!(
            feed_all(&mut parser, b"TEST\n"),
            Ok(Some(ScreenCommand::TestPattern))
        );
    }

    #[test]
    fn test_too_many_values() {
        let line = screen_line(0..65);
        assert_eq!(
            feed_all(&mut LineParser::new(), line.as_bytes()),
            Err(LineError::WrongCount(65))
        );
    }

    #[test]
    fn test_test_command() {
        let mut parser = LineParser::new();
        assert_eq!(
            feed_all(&mut parser, b"TEST\r\n"),
            Ok(Some(ScreenCommand::TestPattern))
        );
        assert_eq!(parse_line(b"  TEST  "), Ok(Some(ScreenCommand::TestPattern)));
    }

    #[test]
    fn test_blank_and_unknown_lines() {
        assert_eq!(parse_line(b""), Ok(None));
        assert_eq!(parse_line(b"\r"), Ok(None));
        assert_eq!(parse_line(b"HELLO"), Err(LineError::UnknownCommand));
    }

    #[test]
    fn test_bad_value_position() {
        let line = screen_line(core::iter::repeat(1).take(64));
        let mut bytes: heapless::Vec<u8, 512> = heapless::Vec::new();
        bytes.extend_from_slice(line.as_bytes()).unwrap();
        // "SCREEN:1,1,x,..."
        bytes[11] = b'x';
        assert_eq!(
            feed_all(&mut LineParser::new(), &bytes),
            Err(LineError::BadValue(2))
        );
    }

    #[test]
    fn test_overlong_line_discarded() {
        let mut parser = LineParser::new();
        for _ in 0..MAX_LINE + 5 {
            assert_eq!(parser.feed(b'9'), Ok(None));
        }
        assert!(!parser.is_idle());
        assert_eq!(parser.feed(b'\n'), Err(LineError::TooLong));
        assert!(parser.is_idle());
    }

    #[test]
    fn test_decoder_routes_binary_frame() {
        let mut cells = [0u8; PIXEL_COUNT];
        cells[0] = 5;
        let frame = PixelFrame::from_cells(&cells);
        let mut encoded = [0u8; FRAME_SIZE];
        frame.encode(&mut encoded).unwrap();

        let mut decoder = ScreenDecoder::new();
        assert_eq!(
            decoder.feed_bytes(&encoded),
            Ok(Some(ScreenCommand::Frame(frame)))
        );
    }

    #[test]
    fn test_decoder_routes_text_then_binary() {
        let mut decoder = ScreenDecoder::new();
        assert_eq!(
            decoder.feed_bytes(b"TEST\n"),
            Ok(Some(ScreenCommand::TestPattern))
        );

        let line = screen_line(core::iter::repeat(3).take(64));
        assert_eq!(
            decoder.feed_bytes(line.as_bytes()),
            Ok(Some(ScreenCommand::Frame(PixelFrame::from_cells(&[3; 64]))))
        );

        let mut encoded = [0u8; FRAME_SIZE];
        PixelFrame::from_cells(&[7; 64]).encode(&mut encoded).unwrap();
        assert_eq!(
            decoder.feed_bytes(&encoded),
            Ok(Some(ScreenCommand::Frame(PixelFrame::from_cells(&[7; 64]))))
        );
    }

    #[test]
    fn test_decoder_header_inside_line() {
        let mut decoder = ScreenDecoder::new();
        // 0xAA mid-line belongs to the line, which then fails to parse
        assert_eq!(decoder.feed_bytes(&[b'T', FRAME_HEADER]), Ok(None));
        assert_eq!(
            decoder.feed(b'\n'),
            Err(ScreenError::Line(LineError::UnknownCommand))
        );
    }

    #[test]
    fn test_decoder_checksum_error() {
        let mut encoded = [0u8; FRAME_SIZE];
        PixelFrame::default().encode(&mut encoded).unwrap();
        encoded[FRAME_SIZE - 1] = 0x55;
        assert_eq!(
            ScreenDecoder::new().feed_bytes(&encoded),
            Err(ScreenError::Frame(FrameError::InvalidChecksum))
        );
    }
}
