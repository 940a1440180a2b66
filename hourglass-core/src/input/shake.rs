//! Shake detection
//!
//! Consecutive samples are compared axis by axis; when the summed absolute
//! change exceeds the threshold a shake fires, then nothing fires again until
//! the cooldown has strictly elapsed.

use crate::traits::Acceleration;

/// Default delta threshold (1.5 g)
pub const SHAKE_THRESHOLD_MG: u32 = 1500;

/// Default re-trigger cooldown
pub const SHAKE_COOLDOWN_MS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct ShakeDetector {
    threshold_mg: u32,
    cooldown_ms: u32,
    last: Acceleration,
    last_shake_ms: Option<u64>,
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self::new(SHAKE_THRESHOLD_MG, SHAKE_COOLDOWN_MS)
    }
}

impl ShakeDetector {
    pub fn new(threshold_mg: u32, cooldown_ms: u32) -> Self {
        Self {
            threshold_mg,
            cooldown_ms,
            last: Acceleration::default(),
            last_shake_ms: None,
        }
    }

    /// Feed one sample; returns true if a shake fired
    ///
    /// The reference sample is updated on every call, including ones that
    /// land inside the cooldown.
    pub fn update(&mut self, sample: Acceleration, now_ms: u64) -> bool {
        let delta = sample.delta_sum(&self.last);
        self.last = sample;

        if delta <= self.threshold_mg {
            return false;
        }

        let cooled = match self.last_shake_ms {
            Some(at) => now_ms.saturating_sub(at) > u64::from(self.cooldown_ms),
            None => true,
        };

        if cooled {
            self.last_shake_ms = Some(now_ms);
        }
        cooled
    }

    /// Seed the reference sample without evaluating it
    pub fn prime(&mut self, sample: Acceleration) {
        self.last = sample;
    }
}
