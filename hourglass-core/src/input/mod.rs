//! Input sampling
//!
//! Turns raw button levels and accelerometer samples into [`Event`]s. The
//! firmware input task calls [`InputSampler::sample`] once per tick and
//! forwards the returned events to the event queue.

pub mod button;
pub mod event;
pub mod shake;
pub mod tilt;

pub use button::{ButtonTracker, Press, LONG_PRESS_MS};
pub use event::{Button, Event};
pub use shake::ShakeDetector;
pub use tilt::{TiltDetector, TiltZone};

use heapless::Vec;

use crate::config::InputConfig;
use crate::traits::Acceleration;

/// Upper bound of events one tick can produce (shake + 3 buttons + tilt)
pub const MAX_EVENTS_PER_TICK: usize = 5;

/// Events produced by one sampling tick, in emission order
pub type EventBatch = Vec<Event, MAX_EVENTS_PER_TICK>;

/// Raw readings for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSample {
    /// Button levels indexed A, B, C
    pub buttons: [bool; 3],
    /// Accelerometer reading, `None` if the read failed this tick
    pub accel: Option<Acceleration>,
}

/// All per-input detectors
#[derive(Debug, Clone)]
pub struct InputSampler {
    buttons: [ButtonTracker; 3],
    shake: ShakeDetector,
    tilt: Option<TiltDetector>,
    primed: bool,
}

impl InputSampler {
    pub fn new(config: &InputConfig) -> Self {
        let tracker = ButtonTracker::new(config.long_press_ms);
        Self {
            buttons: [tracker.clone(), tracker.clone(), tracker],
            shake: ShakeDetector::new(config.shake_threshold_mg, config.shake_cooldown_ms),
            tilt: config
                .tilt_enabled
                .then(|| TiltDetector::new(config.tilt_enter_mg, config.tilt_exit_mg)),
            primed: false,
        }
    }

    /// Process one tick of readings
    pub fn sample(&mut self, sample: &InputSample, now_ms: u64) -> EventBatch {
        let mut events = EventBatch::new();

        if let Some(accel) = sample.accel {
            if !self.primed {
                self.shake.prime(accel);
                self.primed = true;
            } else if self.shake.update(accel, now_ms) {
                let _ = events.push(Event::Shake);
            }
        }

        for (i, button) in Button::ALL.iter().enumerate() {
            match self.buttons[i].poll(sample.buttons[i], now_ms) {
                Some(Press::Short) => {
                    let _ = events.push(Event::short(*button));
                }
                Some(Press::Long) => {
                    let _ = events.push(Event::long(*button));
                }
                None => {}
            }
        }

        if let (Some(tilt), Some(accel)) = (self.tilt.as_mut(), sample.accel) {
            if let Some(zone) = tilt.update(accel.x_mg) {
                let event = match zone {
                    TiltZone::Left => Event::TiltLeft,
                    TiltZone::Right => Event::TiltRight,
                    TiltZone::Center => Event::TiltCenter,
                };
                let _ = events.push(event);
            }
        }

        events
    }
}
