//! 8×8 LED matrix
//!
//! The strip is wound boustrophedon-style behind the panel: even rows run
//! right-to-left, odd rows left-to-right. All drawing goes through
//! [`FrameBuffer`], which only restages cells whose color changed since the
//! last transmission.

pub mod buffer;
pub mod glyphs;

pub use buffer::FrameBuffer;
pub use smart_leds::RGB8;

/// Matrix edge length
pub const WIDTH: usize = 8;

/// Total LEDs on the strip
pub const LED_COUNT: usize = WIDTH * WIDTH;

/// Brightness the strip is driven at outside of lighting mode
pub const DEFAULT_BRIGHTNESS: u8 = 51;

/// Matrix color (24-bit RGB)
pub type Color = RGB8;

/// Build a color from a 0xRRGGBB literal
pub const fn rgb(hex: u32) -> Color {
    RGB8 {
        r: (hex >> 16) as u8,
        g: (hex >> 8) as u8,
        b: hex as u8,
    }
}

pub const BLACK: Color = rgb(0x000000);
pub const RED: Color = rgb(0xFF0000);
pub const GREEN: Color = rgb(0x00FF00);
pub const BLUE: Color = rgb(0x0000FF);
pub const YELLOW: Color = rgb(0xFFFF00);
pub const PURPLE: Color = rgb(0xFF00FF);
pub const CYAN: Color = rgb(0x00FFFF);
pub const WHITE: Color = rgb(0xFFFFFF);

/// Strip index for matrix coordinate (x, y)
///
/// Returns `None` outside the 8×8 grid.
pub fn serpentine_index(x: i32, y: i32) -> Option<usize> {
    if !(0..WIDTH as i32).contains(&x) || !(0..WIDTH as i32).contains(&y) {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    Some(if y % 2 == 0 {
        y * WIDTH + (WIDTH - 1 - x)
    } else {
        y * WIDTH + x
    })
}

/// Matrix coordinate for a strip index
pub fn serpentine_coords(index: usize) -> Option<(i32, i32)> {
    if index >= LED_COUNT {
        return None;
    }
    let y = index / WIDTH;
    let col = index % WIDTH;
    let x = if y % 2 == 0 { WIDTH - 1 - col } else { col };
    Some((x as i32, y as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rows() {
        for x in 0..8 {
            assert_eq!(serpentine_index(x, 0), Some(7 - x as usize));
            assert_eq!(serpentine_index(x, 1), Some(8 + x as usize));
        }
        assert_eq!(serpentine_index(0, 7), Some(56));
        assert_eq!(serpentine_index(7, 7), Some(63));
        assert_eq!(serpentine_index(7, 6), Some(48));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(serpentine_index(-1, 0), None);
        assert_eq!(serpentine_index(0, 8), None);
        assert_eq!(serpentine_index(8, 3), None);
        assert_eq!(serpentine_coords(64), None);
    }

    #[test]
    fn test_rgb_literal() {
        assert_eq!(rgb(0x964B00), RGB8 { r: 0x96, g: 0x4B, b: 0x00 });
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn mapping_is_bijection() {
            let mut seen = [false; LED_COUNT];
            for y in 0..8 {
                for x in 0..8 {
                    let i = serpentine_index(x, y).unwrap();
                    assert!(!seen[i], "index {} hit twice", i);
                    seen[i] = true;
                }
            }
            assert!(seen.iter().all(|&s| s));
        }

        proptest! {
            #[test]
            fn coords_invert_index(x in 0i32..8, y in 0i32..8) {
                let i = serpentine_index(x, y).unwrap();
                prop_assert!(i < LED_COUNT);
                prop_assert_eq!(serpentine_coords(i), Some((x, y)));
            }
        }
    }
}
