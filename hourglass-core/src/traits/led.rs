//! Addressable LED strip trait

use smart_leds::RGB8;

/// Trait for the physical WS2812-style strip behind the matrix
///
/// Pixel writes are staged and only become visible on [`LedStrip::show`],
/// so a whole frame goes out as one bus transmission.
pub trait LedStrip {
    /// Stage a color at a physical strip index (0-63)
    fn stage(&mut self, index: usize, color: RGB8);

    /// Push all staged pixels to the strip
    fn show(&mut self);

    /// Set the global brightness scalar (0-255)
    ///
    /// Applied by the strip on output, independent of the staged colors.
    /// Takes effect on the next [`LedStrip::show`].
    fn set_brightness(&mut self, brightness: u8);

    /// Current global brightness
    fn brightness(&self) -> u8;
}
