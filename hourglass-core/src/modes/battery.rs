//! Battery level mode
//!
//! Shows the charge estimate as a number, green on battery and yellow while
//! charging. The matrix only has room for two digits, so a full battery
//! reads 99.

use crate::input::Event;
use crate::matrix::{GREEN, YELLOW};
use crate::mode::{Mode, ModeContext};

/// Redraw period while the mode is active
pub const REFRESH_MS: u64 = 1000;

#[derive(Default)]
pub struct BatteryMode {
    last_refresh_ms: u64,
}

impl BatteryMode {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&mut self, cx: &mut ModeContext<'_>) {
        self.last_refresh_ms = cx.now_ms;
        match cx.power {
            Some(p) => {
                let color = if p.charging { YELLOW } else { GREEN };
                cx.matrix.show_number(p.battery_percent.min(99), color);
            }
            // Nothing published yet
            None => cx.matrix.clear(),
        }
        cx.flush();
    }
}

impl Mode for BatteryMode {
    fn name(&self) -> &'static str {
        "Battery"
    }

    fn begin(&mut self, cx: &mut ModeContext<'_>) {
        self.refresh(cx);
    }

    fn update(&mut self, cx: &mut ModeContext<'_>) {
        if cx.now_ms.saturating_sub(self.last_refresh_ms) >= REFRESH_MS {
            self.refresh(cx);
        }
    }

    fn exit(&mut self, cx: &mut ModeContext<'_>) {
        cx.matrix.clear();
        cx.flush();
    }

    fn handle_event(&mut self, event: Event, cx: &mut ModeContext<'_>) {
        if event == Event::ButtonB {
            self.refresh(cx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::BLACK;
    use crate::mode::tests::Rig;
    use crate::power::PowerSnapshot;

    fn snapshot(percent: u8, charging: bool) -> Option<PowerSnapshot> {
        Some(PowerSnapshot {
            battery_percent: percent,
            charging,
            ..PowerSnapshot::default()
        })
    }

    fn lit(rig: &Rig) -> usize {
        (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| rig.matrix.pixel(x, y) != Some(BLACK))
            .count()
    }

    #[test]
    fn test_discharging_green() {
        let mut rig = Rig::new();
        rig.power = snapshot(80, false);
        let mut m = BatteryMode::new();
        m.begin(&mut rig.cx());
        // "8" top bar
        assert_eq!(rig.matrix.pixel(0, 0), Some(GREEN));
        assert_eq!(rig.matrix.dirty_count(), 0);
    }

    #[test]
    fn test_charging_yellow() {
        let mut rig = Rig::new();
        rig.power = snapshot(42, true);
        let mut m = BatteryMode::new();
        m.begin(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(0, 0), Some(YELLOW));
    }

    #[test]
    fn test_full_reads_99() {
        let mut rig = Rig::new();
        rig.power = snapshot(100, false);
        let mut m = BatteryMode::new();
        m.begin(&mut rig.cx());
        assert!(lit(&rig) > 0);

        let mut expected = Rig::new();
        expected.matrix.show_number(99, GREEN);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(rig.matrix.pixel(x, y), expected.matrix.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_no_telemetry_blank() {
        let mut rig = Rig::new();
        let mut m = BatteryMode::new();
        m.begin(&mut rig.cx());
        assert_eq!(lit(&rig), 0);
    }

    #[test]
    fn test_periodic_refresh() {
        let mut rig = Rig::new();
        rig.power = snapshot(50, false);
        let mut m = BatteryMode::new();
        m.begin(&mut rig.cx());

        rig.power = snapshot(50, true);
        rig.now_ms = 900;
        m.update(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(0, 0), Some(GREEN));

        rig.now_ms = 1000;
        m.update(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(0, 0), Some(YELLOW));
    }

    #[test]
    fn test_b_refreshes_now() {
        let mut rig = Rig::new();
        rig.power = snapshot(50, false);
        let mut m = BatteryMode::new();
        m.begin(&mut rig.cx());

        rig.power = snapshot(50, true);
        rig.now_ms = 10;
        m.handle_event(Event::ButtonB, &mut rig.cx());
        assert_eq!(rig.matrix.pixel(0, 0), Some(YELLOW));
    }
}
