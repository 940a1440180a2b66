//! Configuration type definitions

use hourglass_protocol::sequence::BYTE_SETTLE_MS;
use hourglass_protocol::{LoopMode, PulseTiming, MAX_TRACK, MAX_VOLUME};

use crate::input::button::LONG_PRESS_MS;
use crate::input::shake::{SHAKE_COOLDOWN_MS, SHAKE_THRESHOLD_MG};
use crate::input::tilt::{TILT_ENTER_MG, TILT_EXIT_MG};
use crate::matrix::DEFAULT_BRIGHTNESS;

/// Input sampling
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    /// Sampling period
    pub tick_ms: u32,
    /// Hold time that turns a press into a long press
    pub long_press_ms: u32,
    /// Summed per-axis delta that counts as a shake
    pub shake_threshold_mg: u32,
    /// Minimum gap between two shakes
    pub shake_cooldown_ms: u32,
    /// Emit tilt events at all
    pub tilt_enabled: bool,
    pub tilt_enter_mg: i32,
    pub tilt_exit_mg: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            long_press_ms: LONG_PRESS_MS,
            shake_threshold_mg: SHAKE_THRESHOLD_MG,
            shake_cooldown_ms: SHAKE_COOLDOWN_MS,
            tilt_enabled: true,
            tilt_enter_mg: TILT_ENTER_MG,
            tilt_exit_mg: TILT_EXIT_MG,
        }
    }
}

/// Audio module and audio task
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Volume applied at startup (0-30)
    pub volume: u8,
    /// Loop mode applied at startup
    pub loop_mode: LoopMode,
    /// Tracks on the module's storage (1-9999)
    pub max_tracks: u16,
    /// Minimum gap between async sequencer steps
    pub min_interval_ms: u32,
    /// How long the audio task waits for a message per loop
    pub receive_timeout_ms: u32,
    /// Bounded wait for the audio device mutex
    pub mutex_wait_ms: u32,
    /// Line calibration
    pub pulse: PulseTiming,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: MAX_VOLUME,
            loop_mode: LoopMode::Disabled,
            max_tracks: 9,
            min_interval_ms: 20,
            receive_timeout_ms: 10,
            mutex_wait_ms: 50,
            pulse: PulseTiming::STANDARD,
        }
    }
}

/// LED matrix
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixConfig {
    /// Global strip brightness outside lighting mode
    pub brightness: u8,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

/// Power telemetry
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Publish period of the sensor task
    pub period_ms: u32,
    /// Battery voltage read as 0 %
    pub battery_empty_mv: u16,
    /// Battery voltage read as 100 %
    pub battery_full_mv: u16,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            period_ms: 500,
            battery_empty_mv: 3300,
            battery_full_mv: 4200,
        }
    }
}

/// Mode task
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModesConfig {
    /// Mode task period
    pub tick_ms: u32,
    /// Screen-art session ends after this long without a valid frame
    pub screen_session_timeout_ms: u32,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            screen_session_timeout_ms: 5000,
        }
    }
}

/// Countdown timer mode
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// Countdown length (1-99 s, fits two digits)
    pub duration_s: u8,
    /// Lead-in countdown before the timer starts (1-9 s)
    pub lead_in_s: u8,
    /// Pause between the start cue and the lead-in
    pub cue_delay_ms: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_s: 60,
            lead_in_s: 3,
            cue_delay_ms: 500,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub input: InputConfig,
    pub audio: AudioConfig,
    pub matrix: MatrixConfig,
    pub sensor: SensorConfig,
    pub modes: ModesConfig,
    pub timer: TimerConfig,
}

impl DeviceConfig {
    /// Copy with every value clamped into its working range
    pub fn sanitized(&self) -> Self {
        let mut c = self.clone();

        c.input.tick_ms = c.input.tick_ms.max(1);
        c.input.long_press_ms = c.input.long_press_ms.max(c.input.tick_ms);
        c.input.tilt_enter_mg = c.input.tilt_enter_mg.max(1);
        c.input.tilt_exit_mg = c.input.tilt_exit_mg.clamp(0, c.input.tilt_enter_mg);

        c.audio.volume = c.audio.volume.min(MAX_VOLUME);
        c.audio.max_tracks = c.audio.max_tracks.clamp(1, MAX_TRACK);
        c.audio.receive_timeout_ms = c.audio.receive_timeout_ms.max(1);
        c.audio.mutex_wait_ms = c.audio.mutex_wait_ms.max(1);
        // The module needs at least one byte settle time between steps
        c.audio.min_interval_ms = c.audio.min_interval_ms.max(BYTE_SETTLE_MS);
        let p = c.audio.pulse;
        if p.short_us == 0 || p.long_us <= p.short_us || p.guard_us == 0 || p.lead_us == 0 {
            c.audio.pulse = PulseTiming::STANDARD;
        }

        c.sensor.period_ms = c.sensor.period_ms.max(1);
        if c.sensor.battery_full_mv <= c.sensor.battery_empty_mv {
            let d = SensorConfig::default();
            c.sensor.battery_empty_mv = d.battery_empty_mv;
            c.sensor.battery_full_mv = d.battery_full_mv;
        }

        c.modes.tick_ms = c.modes.tick_ms.max(1);

        c.timer.duration_s = c.timer.duration_s.clamp(1, 99);
        c.timer.lead_in_s = c.timer.lead_in_s.clamp(1, 9);

        c
    }
}
