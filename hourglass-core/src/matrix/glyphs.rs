//! Digit font and icons
//!
//! Glyph rows are bitmasks with the most significant used bit as the leftmost
//! column. Drawing only writes into the frame buffer; the caller flushes.

use super::{Color, FrameBuffer};

/// 4×8 digit font, one nibble per row
pub const DIGITS: [[u8; 8]; 10] = [
    [0b1111, 0b1001, 0b1001, 0b1001, 0b1001, 0b1001, 0b1001, 0b1111],
    [0b0010, 0b0110, 0b1010, 0b0010, 0b0010, 0b0010, 0b0010, 0b1111],
    [0b1111, 0b0001, 0b0001, 0b1111, 0b1000, 0b1000, 0b1000, 0b1111],
    [0b1111, 0b0001, 0b0001, 0b1111, 0b0001, 0b0001, 0b0001, 0b1111],
    [0b1001, 0b1001, 0b1001, 0b1111, 0b0001, 0b0001, 0b0001, 0b0001],
    [0b1111, 0b1000, 0b1000, 0b1111, 0b0001, 0b0001, 0b0001, 0b1111],
    [0b1111, 0b1000, 0b1000, 0b1111, 0b1001, 0b1001, 0b1001, 0b1111],
    [0b1111, 0b0001, 0b0001, 0b0001, 0b0001, 0b0001, 0b0001, 0b0001],
    [0b1111, 0b1001, 0b1001, 0b1111, 0b1001, 0b1001, 0b1001, 0b1111],
    [0b1111, 0b1001, 0b1001, 0b1111, 0b0001, 0b0001, 0b0001, 0b1111],
];

/// Stopwatch outline shown while the timer is idle
pub const STOPWATCH: [u8; 8] = [
    0b1111_1111,
    0b1000_0001,
    0b1010_0101,
    0b1001_1001,
    0b1001_1001,
    0b1010_0101,
    0b1000_0001,
    0b1111_1111,
];

const DIGIT_WIDTH: i32 = 4;

impl FrameBuffer {
    /// Draw a `width`-column bitmap with its left edge at `x_offset`
    ///
    /// Only set bits are written; clear bits leave the cell untouched.
    pub fn draw_bitmap(&mut self, rows: &[u8; 8], width: i32, x_offset: i32, color: Color) {
        for (y, row) in rows.iter().enumerate() {
            for col in 0..width {
                if row & (1 << (width - 1 - col)) != 0 {
                    self.set_pixel(x_offset + col, y as i32, color);
                }
            }
        }
    }

    /// Draw one digit; values above 9 are ignored
    pub fn show_digit(&mut self, digit: u8, x_offset: i32, color: Color) {
        if let Some(glyph) = DIGITS.get(digit as usize) {
            self.draw_bitmap(glyph, DIGIT_WIDTH, x_offset, color);
        }
    }

    /// Clear, then draw 0..=99 (single digits centered)
    ///
    /// Values above 99 leave the matrix blank.
    pub fn show_number(&mut self, number: u8, color: Color) {
        self.clear();
        match number {
            0..=9 => self.show_digit(number, 2, color),
            10..=99 => {
                self.show_digit(number / 10, 0, color);
                self.show_digit(number % 10, 4, color);
            }
            _ => {}
        }
    }

    /// Clear, then draw two independent digits side by side
    pub fn show_two_numbers(&mut self, left: u8, right: u8, left_color: Color, right_color: Color) {
        self.clear();
        self.show_digit(left, 0, left_color);
        self.show_digit(right, 4, right_color);
    }

    /// Clear, then draw the stopwatch icon
    pub fn show_stopwatch(&mut self, color: Color) {
        self.clear();
        self.draw_bitmap(&STOPWATCH, 8, 0, color);
    }
}
