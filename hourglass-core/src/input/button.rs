//! Short/long press classification
//!
//! A long press is reported at the tick where the hold time first reaches
//! the threshold, while the button is still down. Releasing afterwards
//! produces nothing. A release before the threshold is a short press.

/// Default hold time for a long press
pub const LONG_PRESS_MS: u32 = 1000;

/// Classified press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Press {
    Short,
    Long,
}

/// Per-button press tracker, fed one sample per input tick
#[derive(Debug, Clone)]
pub struct ButtonTracker {
    long_press_ms: u32,
    pressed: bool,
    pressed_at_ms: u64,
    long_fired: bool,
}

impl Default for ButtonTracker {
    fn default() -> Self {
        Self::new(LONG_PRESS_MS)
    }
}

impl ButtonTracker {
    pub fn new(long_press_ms: u32) -> Self {
        Self {
            long_press_ms,
            pressed: false,
            pressed_at_ms: 0,
            long_fired: false,
        }
    }

    /// Feed the current button level
    ///
    /// # Arguments
    /// - `pressed`: debounced button level
    /// - `now_ms`: monotonic time of this sample
    pub fn poll(&mut self, pressed: bool, now_ms: u64) -> Option<Press> {
        match (self.pressed, pressed) {
            (false, true) => {
                self.pressed = true;
                self.pressed_at_ms = now_ms;
                self.long_fired = false;
                None
            }
            (true, false) => {
                self.pressed = false;
                let fired = self.long_fired;
                self.long_fired = false;
                if fired {
                    None
                } else {
                    Some(Press::Short)
                }
            }
            (true, true) => {
                let held = now_ms.saturating_sub(self.pressed_at_ms);
                if !self.long_fired && held >= u64::from(self.long_press_ms) {
                    self.long_fired = true;
                    Some(Press::Long)
                } else {
                    None
                }
            }
            (false, false) => None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
