//! Screen-art mode
//!
//! Shows 8×8 frames pushed from a host over the serial link, each cell a
//! 4-bit index into [`PALETTE`]. Button A toggles a local test pattern of
//! rolling palette stripes; the host can also start it with a `TEST` line.

use hourglass_protocol::{PixelFrame, ScreenCommand, FRAME_WIDTH};

use crate::input::Event;
use crate::matrix::{rgb, Color, BLACK, BLUE, CYAN, PURPLE, RED, WHITE, YELLOW};
use crate::mode::{Mode, ModeContext};

/// Colors addressable from a pixel frame
pub const PALETTE: [Color; 16] = [
    BLACK,
    RED,
    rgb(0x00FF00),
    BLUE,
    YELLOW,
    PURPLE,
    CYAN,
    WHITE,
    rgb(0xFF8000),
    rgb(0x008000),
    rgb(0x000080),
    rgb(0x964B00),
    rgb(0xFF69B4),
    rgb(0xE0FFFF),
    rgb(0xFFB6C1),
    rgb(0x808080),
];

/// Test pattern frame period
pub const TEST_FRAME_MS: u64 = 200;

#[derive(Default)]
pub struct ScreenMode {
    test_pattern: bool,
    test_frame: u8,
    last_frame_ms: u64,
    frames_shown: u32,
}

impl ScreenMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_test_pattern(&self) -> bool {
        self.test_pattern
    }

    /// Remote frames drawn since boot
    pub fn frames_shown(&self) -> u32 {
        self.frames_shown
    }

    fn draw_frame(frame: &PixelFrame, cx: &mut ModeContext<'_>) {
        for (i, &cell) in frame.cells().iter().enumerate() {
            let x = (i % FRAME_WIDTH) as i32;
            let y = (i / FRAME_WIDTH) as i32;
            cx.matrix.set_pixel(x, y, PALETTE[(cell & 0x0F) as usize]);
        }
        cx.flush();
    }

    fn start_test_pattern(&mut self, cx: &mut ModeContext<'_>) {
        self.test_pattern = true;
        self.test_frame = 0;
        self.last_frame_ms = cx.now_ms;
        self.draw_test_pattern(cx);
    }

    fn draw_test_pattern(&self, cx: &mut ModeContext<'_>) {
        for y in 0..FRAME_WIDTH {
            let color = PALETTE[(y + self.test_frame as usize) % PALETTE.len()];
            for x in 0..FRAME_WIDTH {
                cx.matrix.set_pixel(x as i32, y as i32, color);
            }
        }
        cx.flush();
    }
}

impl Mode for ScreenMode {
    fn name(&self) -> &'static str {
        "Screen"
    }

    fn begin(&mut self, cx: &mut ModeContext<'_>) {
        self.test_pattern = false;
        cx.matrix.clear();
        cx.flush();
    }

    fn update(&mut self, cx: &mut ModeContext<'_>) {
        match cx.remote.take() {
            Some(ScreenCommand::Frame(frame)) => {
                // Host content wins over the local pattern
                self.test_pattern = false;
                self.frames_shown = self.frames_shown.wrapping_add(1);
                Self::draw_frame(&frame, cx);
                return;
            }
            Some(ScreenCommand::TestPattern) => {
                self.start_test_pattern(cx);
                return;
            }
            None => {}
        }

        if self.test_pattern && cx.now_ms.saturating_sub(self.last_frame_ms) >= TEST_FRAME_MS {
            self.last_frame_ms = cx.now_ms;
            self.test_frame = (self.test_frame + 1) % PALETTE.len() as u8;
            self.draw_test_pattern(cx);
        }
    }

    fn exit(&mut self, cx: &mut ModeContext<'_>) {
        self.test_pattern = false;
        cx.matrix.clear();
        cx.flush();
    }

    fn handle_event(&mut self, event: Event, cx: &mut ModeContext<'_>) {
        if event != Event::ButtonA {
            return;
        }
        if !self.test_pattern {
            self.start_test_pattern(cx);
        } else {
            self.test_pattern = false;
            cx.matrix.clear();
            cx.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::tests::Rig;

    #[test]
    fn test_palette_endpoints() {
        assert_eq!(PALETTE[0], BLACK);
        assert_eq!(PALETTE[2], rgb(0x00FF00));
        assert_eq!(PALETTE[15], rgb(0x808080));
    }

    #[test]
    fn test_remote_frame_drawn() {
        let mut rig = Rig::new();
        let mut m = ScreenMode::new();
        m.begin(&mut rig.cx());

        let mut cells = [0u8; 64];
        cells[0] = 1;
        cells[9] = 8;
        cells[63] = 15;
        rig.remote = Some(ScreenCommand::Frame(PixelFrame::from_cells(&cells)));
        m.update(&mut rig.cx());

        assert_eq!(rig.matrix.pixel(0, 0), Some(RED));
        assert_eq!(rig.matrix.pixel(1, 1), Some(rgb(0xFF8000)));
        assert_eq!(rig.matrix.pixel(7, 7), Some(rgb(0x808080)));
        assert_eq!(rig.matrix.pixel(1, 0), Some(BLACK));
        assert_eq!(rig.matrix.dirty_count(), 0);
        assert_eq!(m.frames_shown(), 1);
    }

    #[test]
    fn test_toggle_pattern() {
        let mut rig = Rig::new();
        let mut m = ScreenMode::new();
        m.begin(&mut rig.cx());

        m.handle_event(Event::ButtonA, &mut rig.cx());
        assert!(m.is_test_pattern());
        // First frame drawn immediately: row y = PALETTE[y]
        assert_eq!(rig.matrix.pixel(4, 1), Some(RED));
        assert_eq!(rig.matrix.pixel(0, 7), Some(WHITE));

        rig.now_ms = 199;
        m.update(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(4, 1), Some(RED));

        rig.now_ms = 200;
        m.update(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(4, 0), Some(RED));
        assert_eq!(rig.matrix.pixel(4, 7), Some(rgb(0xFF8000)));

        m.handle_event(Event::ButtonA, &mut rig.cx());
        assert!(!m.is_test_pattern());
        assert_eq!(rig.matrix.pixel(4, 0), Some(BLACK));
    }

    #[test]
    fn test_pattern_wraps_palette() {
        let mut rig = Rig::new();
        let mut m = ScreenMode::new();
        m.begin(&mut rig.cx());
        m.handle_event(Event::ButtonA, &mut rig.cx());
        for step in 1..=16 {
            rig.now_ms = step * TEST_FRAME_MS;
            m.update(&mut rig.cx());
        }
        // Back at frame 0
        assert_eq!(rig.matrix.pixel(0, 1), Some(RED));
    }

    #[test]
    fn test_remote_frame_stops_pattern() {
        let mut rig = Rig::new();
        let mut m = ScreenMode::new();
        m.begin(&mut rig.cx());
        m.handle_event(Event::ButtonA, &mut rig.cx());

        rig.remote = Some(ScreenCommand::Frame(PixelFrame::from_cells(&[3; 64])));
        m.update(&mut rig.cx());
        assert!(!m.is_test_pattern());

        rig.now_ms = 1000;
        m.update(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(2, 6), Some(BLUE));
    }

    #[test]
    fn test_remote_test_command_starts_pattern() {
        let mut rig = Rig::new();
        let mut m = ScreenMode::new();
        m.begin(&mut rig.cx());

        rig.now_ms = 500;
        rig.remote = Some(ScreenCommand::TestPattern);
        m.update(&mut rig.cx());
        assert!(m.is_test_pattern());
        assert_eq!(rig.matrix.pixel(3, 1), Some(RED));
        assert_eq!(rig.matrix.dirty_count(), 0);

        // A repeated command restarts rather than toggling off
        rig.now_ms = 700;
        m.update(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(3, 0), Some(RED));
        rig.remote = Some(ScreenCommand::TestPattern);
        m.update(&mut rig.cx());
        assert!(m.is_test_pattern());
        assert_eq!(rig.matrix.pixel(3, 1), Some(RED));
        assert_eq!(m.frames_shown(), 0);
    }

    #[test]
    fn test_exit_clears() {
        let mut rig = Rig::new();
        let mut m = ScreenMode::new();
        m.begin(&mut rig.cx());
        rig.remote = Some(ScreenCommand::Frame(PixelFrame::from_cells(&[7; 64])));
        m.update(&mut rig.cx());
        m.exit(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(3, 3), Some(BLACK));
        assert_eq!(rig.matrix.dirty_count(), 0);
    }
}
