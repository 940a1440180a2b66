//! Tilt zones from the X axis
//!
//! Entering a side zone needs `enter_mg`; falling back to center needs the
//! reading to drop below `exit_mg`. The gap keeps a hand-held device from
//! chattering between zones.

/// Default zone entry threshold (~35°)
pub const TILT_ENTER_MG: i32 = 600;

/// Default return-to-center threshold (~17°)
pub const TILT_EXIT_MG: i32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TiltZone {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone)]
pub struct TiltDetector {
    enter_mg: i32,
    exit_mg: i32,
    zone: TiltZone,
}

impl Default for TiltDetector {
    fn default() -> Self {
        Self::new(TILT_ENTER_MG, TILT_EXIT_MG)
    }
}

impl TiltDetector {
    pub fn new(enter_mg: i32, exit_mg: i32) -> Self {
        Self {
            enter_mg,
            exit_mg: exit_mg.min(enter_mg),
            zone: TiltZone::Center,
        }
    }

    /// Feed the X-axis reading; returns the new zone on change
    pub fn update(&mut self, x_mg: i32) -> Option<TiltZone> {
        let next = match self.zone {
            TiltZone::Center if x_mg <= -self.enter_mg => TiltZone::Left,
            TiltZone::Center if x_mg >= self.enter_mg => TiltZone::Right,
            TiltZone::Left if x_mg >= self.enter_mg => TiltZone::Right,
            TiltZone::Left if x_mg > -self.exit_mg => TiltZone::Center,
            TiltZone::Right if x_mg <= -self.enter_mg => TiltZone::Left,
            TiltZone::Right if x_mg < self.exit_mg => TiltZone::Center,
            zone => zone,
        };

        if next != self.zone {
            self.zone = next;
            Some(next)
        } else {
            None
        }
    }

    pub fn zone(&self) -> TiltZone {
        self.zone
    }
}
