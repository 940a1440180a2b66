//! Screen-art pixel frames received from a host.
//!
//! Frame format:
//! - HEADER (1 byte): 0xAA synchronization byte
//! - PIXELS (64 bytes): row-major palette indices, low nibble significant
//! - CHECKSUM (1 byte): XOR of the 64 pixel bytes as sent

/// Frame synchronization byte
pub const FRAME_HEADER: u8 = 0xAA;

/// Pixels per frame (8 × 8 matrix)
pub const PIXEL_COUNT: usize = 64;

/// Matrix edge length
pub const FRAME_WIDTH: usize = 8;

/// Complete frame size on the wire
pub const FRAME_SIZE: usize = 1 + PIXEL_COUNT + 1;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Checksum mismatch
    InvalidChecksum,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// One 8×8 frame of palette indices (0..=15)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelFrame {
    cells: [u8; PIXEL_COUNT],
}

impl Default for PixelFrame {
    fn default() -> Self {
        Self {
            cells: [0; PIXEL_COUNT],
        }
    }
}

impl PixelFrame {
    /// Build a frame from row-major palette indices, masking to the low nibble
    pub fn from_cells(cells: &[u8; PIXEL_COUNT]) -> Self {
        let mut frame = Self::default();
        for (dst, src) in frame.cells.iter_mut().zip(cells.iter()) {
            *dst = src & 0x0F;
        }
        frame
    }

    /// Palette index at (x, y), or `None` outside the matrix
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= FRAME_WIDTH || y >= FRAME_WIDTH {
            return None;
        }
        Some(self.cells[y * FRAME_WIDTH + x])
    }

    /// Row-major palette indices
    pub fn cells(&self) -> &[u8; PIXEL_COUNT] {
        &self.cells
    }

    fn checksum(pixels: &[u8]) -> u8 {
        pixels.iter().fold(0, |acc, &b| acc ^ b)
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        if buffer.len() < FRAME_SIZE {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = FRAME_HEADER;
        buffer[1..=PIXEL_COUNT].copy_from_slice(&self.cells);
        buffer[PIXEL_COUNT + 1] = Self::checksum(&self.cells);

        Ok(FRAME_SIZE)
    }
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    pixels: [u8; PIXEL_COUNT],
    received: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for HEADER byte
    WaitingForHeader,
    /// Reading the 64 pixel bytes
    ReadingPixels,
    /// Waiting for CHECKSUM
    WaitingForChecksum,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForHeader,
            pixels: [0; PIXEL_COUNT],
            received: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.received = 0;
    }

    /// True when waiting for a header byte
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForHeader
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on checksum mismatch.
    /// Pixel bytes are taken verbatim, so 0xAA inside the payload does not
    /// resynchronize.
    pub fn feed(&mut self, byte: u8) -> Result<Option<PixelFrame>, FrameError> {
        match self.state {
            ParseState::WaitingForHeader => {
                if byte == FRAME_HEADER {
                    self.received = 0;
                    self.state = ParseState::ReadingPixels;
                }
                Ok(None)
            }
            ParseState::ReadingPixels => {
                self.pixels[self.received] = byte;
                self.received += 1;
                if self.received == PIXEL_COUNT {
                    self.state = ParseState::WaitingForChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                let expected = PixelFrame::checksum(&self.pixels);
                self.reset();

                if byte != expected {
                    return Err(FrameError::InvalidChecksum);
                }

                Ok(Some(PixelFrame::from_cells(&self.pixels)))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<PixelFrame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
