//! Ambient lighting mode
//!
//! The whole matrix glows in one color. A steps through brightness levels,
//! B through colors.

use crate::input::Event;
use crate::matrix::{Color, BLUE, GREEN, RED, WHITE, YELLOW};
use crate::mode::{Mode, ModeContext};

/// Strip brightness steps cycled by button A
pub const BRIGHTNESS_LEVELS: [u8; 10] = [7, 14, 22, 29, 36, 43, 50, 58, 65, 72];

/// Colors cycled by button B
pub const LIGHT_COLORS: [Color; 5] = [RED, YELLOW, BLUE, GREEN, WHITE];

const DEFAULT_COLOR: usize = 4;

pub struct LightingMode {
    level: usize,
    color: usize,
    /// Restored on exit
    default_brightness: u8,
}

impl LightingMode {
    pub fn new(default_brightness: u8) -> Self {
        Self {
            level: 0,
            color: DEFAULT_COLOR,
            default_brightness,
        }
    }

    pub fn brightness(&self) -> u8 {
        BRIGHTNESS_LEVELS[self.level]
    }

    pub fn color(&self) -> Color {
        LIGHT_COLORS[self.color]
    }

    fn apply(&self, cx: &mut ModeContext<'_>) {
        cx.matrix.fill(self.color());
        cx.set_brightness(self.brightness());
        cx.flush();
    }
}

impl Mode for LightingMode {
    fn name(&self) -> &'static str {
        "Lighting"
    }

    fn begin(&mut self, cx: &mut ModeContext<'_>) {
        self.level = 0;
        self.apply(cx);
    }

    fn update(&mut self, _cx: &mut ModeContext<'_>) {}

    fn exit(&mut self, cx: &mut ModeContext<'_>) {
        cx.matrix.clear();
        cx.set_brightness(self.default_brightness);
        cx.flush();
    }

    fn handle_event(&mut self, event: Event, cx: &mut ModeContext<'_>) {
        match event {
            Event::ButtonA => {
                self.level = (self.level + 1) % BRIGHTNESS_LEVELS.len();
                self.apply(cx);
            }
            Event::ButtonB => {
                self.color = (self.color + 1) % LIGHT_COLORS.len();
                self.apply(cx);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{BLACK, DEFAULT_BRIGHTNESS};
    use crate::mode::tests::Rig;

    #[test]
    fn test_begin_fills_white_dimmest() {
        let mut rig = Rig::new();
        let mut m = LightingMode::new(DEFAULT_BRIGHTNESS);
        m.begin(&mut rig.cx());
        assert_eq!(rig.strip.brightness, 7);
        assert_eq!(rig.matrix.pixel(3, 5), Some(WHITE));
        assert_eq!(rig.matrix.dirty_count(), 0);
    }

    #[test]
    fn test_a_cycles_brightness() {
        let mut rig = Rig::new();
        let mut m = LightingMode::new(DEFAULT_BRIGHTNESS);
        m.begin(&mut rig.cx());
        for expected in BRIGHTNESS_LEVELS.iter().skip(1) {
            m.handle_event(Event::ButtonA, &mut rig.cx());
            assert_eq!(rig.strip.brightness, *expected);
        }
        m.handle_event(Event::ButtonA, &mut rig.cx());
        assert_eq!(rig.strip.brightness, 7);
    }

    #[test]
    fn test_b_cycles_color_keeps_level() {
        let mut rig = Rig::new();
        let mut m = LightingMode::new(DEFAULT_BRIGHTNESS);
        m.begin(&mut rig.cx());
        m.handle_event(Event::ButtonA, &mut rig.cx());

        m.handle_event(Event::ButtonB, &mut rig.cx());
        assert_eq!(m.color(), RED);
        assert_eq!(rig.matrix.pixel(0, 0), Some(RED));
        assert_eq!(rig.strip.brightness, 14);

        for _ in 0..4 {
            m.handle_event(Event::ButtonB, &mut rig.cx());
        }
        assert_eq!(m.color(), WHITE);
    }

    #[test]
    fn test_reentry_resets_level_not_color() {
        let mut rig = Rig::new();
        let mut m = LightingMode::new(DEFAULT_BRIGHTNESS);
        m.begin(&mut rig.cx());
        m.handle_event(Event::ButtonA, &mut rig.cx());
        m.handle_event(Event::ButtonB, &mut rig.cx());
        m.exit(&mut rig.cx());
        m.begin(&mut rig.cx());
        assert_eq!(m.brightness(), 7);
        assert_eq!(m.color(), RED);
    }

    #[test]
    fn test_exit_restores_brightness() {
        let mut rig = Rig::new();
        let mut m = LightingMode::new(DEFAULT_BRIGHTNESS);
        m.begin(&mut rig.cx());
        m.exit(&mut rig.cx());
        assert_eq!(rig.strip.brightness, DEFAULT_BRIGHTNESS);
        assert_eq!(rig.matrix.pixel(3, 5), Some(BLACK));
        assert_eq!(rig.matrix.dirty_count(), 0);
    }
}
