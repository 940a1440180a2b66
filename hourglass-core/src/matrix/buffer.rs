//! Change-tracking frame buffer

use super::{serpentine_index, Color, BLACK, LED_COUNT};
use crate::traits::LedStrip;

/// Cached matrix contents plus the colors last sent to the strip
///
/// A cell is dirty exactly when its cached color differs from its
/// transmitted color, so writing a cell back to its transmitted value before
/// the next [`FrameBuffer::update`] costs nothing on the bus.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    cells: [Color; LED_COUNT],
    sent: [Color; LED_COUNT],
    force_show: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Buffer for a strip assumed dark at power-on
    pub fn new() -> Self {
        Self {
            cells: [BLACK; LED_COUNT],
            sent: [BLACK; LED_COUNT],
            force_show: true,
        }
    }

    /// Write a cell by matrix coordinate; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(index) = serpentine_index(x, y) {
            self.cells[index] = color;
        }
    }

    /// Write a cell by strip index; out-of-range indices are ignored
    pub fn set_index(&mut self, index: usize, color: Color) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = color;
        }
    }

    /// Cached color at (x, y)
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        serpentine_index(x, y).map(|i| self.cells[i])
    }

    /// Zero every cell
    pub fn clear(&mut self) {
        self.fill(BLACK);
    }

    /// Set every cell to one color
    pub fn fill(&mut self, color: Color) {
        self.cells = [color; LED_COUNT];
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        index < LED_COUNT && self.cells[index] != self.sent[index]
    }

    pub fn dirty_count(&self) -> usize {
        self.cells
            .iter()
            .zip(self.sent.iter())
            .filter(|(c, s)| c != s)
            .count()
    }

    /// Make the next update call `show` even with no dirty cells
    ///
    /// Used after a brightness change, which the strip applies on output.
    pub fn request_show(&mut self) {
        self.force_show = true;
    }

    /// Stage dirty cells on the strip and transmit once
    ///
    /// Returns the number of cells restaged. The strip is not touched when
    /// nothing changed.
    pub fn update<S: LedStrip + ?Sized>(&mut self, strip: &mut S) -> usize {
        let mut staged = 0;
        for index in 0..LED_COUNT {
            if self.cells[index] != self.sent[index] {
                strip.stage(index, self.cells[index]);
                self.sent[index] = self.cells[index];
                staged += 1;
            }
        }

        if staged > 0 || self.force_show {
            strip.show();
            self.force_show = false;
        }
        staged
    }
}
