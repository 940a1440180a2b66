//! Minimal TOML reader for `device.toml`
//!
//! Handles only the subset the device file uses, without allocating:
//! - `[section]` and `[section.sub]` headers
//! - `key = value` with integers, booleans and quoted strings
//! - `#` comments, whole-line or trailing
//!
//! Keys that are absent keep their defaults. Unknown sections and keys are
//! errors so typos do not go unnoticed.

use hourglass_protocol::audio::PulsePreset;
use hourglass_protocol::{LoopMode, PulseTiming};

use super::types::DeviceConfig;

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigErrorKind {
    /// Line is neither a header nor `key = value`
    Syntax,
    /// Unknown section header
    InvalidSection,
    /// Key not valid in the current section
    UnknownKey,
    /// Value has the wrong type or is out of range for its type
    InvalidValue,
}

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigError {
    pub line: usize,
    pub kind: ConfigErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Input,
    Audio,
    AudioPulse,
    Matrix,
    Sensor,
    Modes,
    Timer,
}

/// Parse TOML text into a [`DeviceConfig`] layered over the defaults
///
/// The result is not sanitized; call [`DeviceConfig::sanitized`] on it.
pub fn parse_config(input: &str) -> Result<DeviceConfig, ConfigError> {
    let mut config = DeviceConfig::default();
    let mut pulse = PulseKeys::default();
    let mut section = Section::Root;

    for (n, raw) in input.lines().enumerate() {
        let line_no = n + 1;
        let err = |kind| ConfigError {
            line: line_no,
            kind,
        };

        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(err(ConfigErrorKind::Syntax));
            }
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(err(ConfigErrorKind::InvalidSection))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(err(ConfigErrorKind::Syntax))?;
        apply_value(&mut config, &mut pulse, section, key, value).map_err(err)?;
    }

    config.audio.pulse = pulse.resolve(config.audio.pulse);
    Ok(config)
}

/// `[audio.pulse]` keys, collected so the preset applies before any
/// individual width regardless of line order
#[derive(Debug, Default)]
struct PulseKeys {
    preset: Option<PulsePreset>,
    guard_us: Option<u32>,
    lead_us: Option<u32>,
    long_us: Option<u32>,
    short_us: Option<u32>,
}

impl PulseKeys {
    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigErrorKind> {
        match key {
            "preset" => self.preset = Some(parse_preset(value)?),
            "guard_us" => self.guard_us = Some(parse_int(value)?),
            "lead_us" => self.lead_us = Some(parse_int(value)?),
            "long_us" => self.long_us = Some(parse_int(value)?),
            "short_us" => self.short_us = Some(parse_int(value)?),
            _ => return Err(ConfigErrorKind::UnknownKey),
        }
        Ok(())
    }

    fn resolve(&self, base: PulseTiming) -> PulseTiming {
        let p = self.preset.map(|p| p.timing()).unwrap_or(base);
        PulseTiming {
            guard_us: self.guard_us.unwrap_or(p.guard_us),
            lead_us: self.lead_us.unwrap_or(p.lead_us),
            long_us: self.long_us.unwrap_or(p.long_us),
            short_us: self.short_us.unwrap_or(p.short_us),
        }
    }
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "input" => Some(Section::Input),
        "audio" => Some(Section::Audio),
        "audio.pulse" => Some(Section::AudioPulse),
        "matrix" => Some(Section::Matrix),
        "sensor" => Some(Section::Sensor),
        "modes" => Some(Section::Modes),
        "timer" => Some(Section::Timer),
        _ => None,
    }
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split "key = value"
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ConfigErrorKind> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ConfigErrorKind::InvalidValue)
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigErrorKind> {
    // TOML allows underscores as digit separators
    let mut digits = heapless::String::<24>::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits.push(c).map_err(|_| ConfigErrorKind::InvalidValue)?;
    }
    digits.parse().map_err(|_| ConfigErrorKind::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ConfigErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigErrorKind::InvalidValue),
    }
}

fn parse_loop_mode(value: &str) -> Result<LoopMode, ConfigErrorKind> {
    match parse_string(value)? {
        "single" => Ok(LoopMode::Single),
        "folder" => Ok(LoopMode::Folder),
        "disabled" | "off" => Ok(LoopMode::Disabled),
        _ => Err(ConfigErrorKind::InvalidValue),
    }
}

fn parse_preset(value: &str) -> Result<PulsePreset, ConfigErrorKind> {
    match parse_string(value)? {
        "standard" => Ok(PulsePreset::Standard),
        "legacy" => Ok(PulsePreset::Legacy),
        _ => Err(ConfigErrorKind::InvalidValue),
    }
}

fn apply_value(
    config: &mut DeviceConfig,
    pulse: &mut PulseKeys,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ConfigErrorKind> {
    match section {
        Section::Root => return Err(ConfigErrorKind::UnknownKey),
        Section::Input => {
            let c = &mut config.input;
            match key {
                "tick_ms" => c.tick_ms = parse_int(value)?,
                "long_press_ms" => c.long_press_ms = parse_int(value)?,
                "shake_threshold_mg" => c.shake_threshold_mg = parse_int(value)?,
                "shake_cooldown_ms" => c.shake_cooldown_ms = parse_int(value)?,
                "tilt_enabled" => c.tilt_enabled = parse_bool(value)?,
                "tilt_enter_mg" => c.tilt_enter_mg = parse_int(value)?,
                "tilt_exit_mg" => c.tilt_exit_mg = parse_int(value)?,
                _ => return Err(ConfigErrorKind::UnknownKey),
            }
        }
        Section::Audio => {
            let c = &mut config.audio;
            match key {
                "volume" => c.volume = parse_int(value)?,
                "loop_mode" => c.loop_mode = parse_loop_mode(value)?,
                "max_tracks" => c.max_tracks = parse_int(value)?,
                "min_interval_ms" => c.min_interval_ms = parse_int(value)?,
                "receive_timeout_ms" => c.receive_timeout_ms = parse_int(value)?,
                "mutex_wait_ms" => c.mutex_wait_ms = parse_int(value)?,
                _ => return Err(ConfigErrorKind::UnknownKey),
            }
        }
        Section::AudioPulse => pulse.apply(key, value)?,
        Section::Matrix => match key {
            "brightness" => config.matrix.brightness = parse_int(value)?,
            _ => return Err(ConfigErrorKind::UnknownKey),
        },
        Section::Sensor => {
            let c = &mut config.sensor;
            match key {
                "period_ms" => c.period_ms = parse_int(value)?,
                "battery_empty_mv" => c.battery_empty_mv = parse_int(value)?,
                "battery_full_mv" => c.battery_full_mv = parse_int(value)?,
                _ => return Err(ConfigErrorKind::UnknownKey),
            }
        }
        Section::Modes => {
            let c = &mut config.modes;
            match key {
                "tick_ms" => c.tick_ms = parse_int(value)?,
                "screen_session_timeout_ms" => c.screen_session_timeout_ms = parse_int(value)?,
                _ => return Err(ConfigErrorKind::UnknownKey),
            }
        }
        Section::Timer => {
            let c = &mut config.timer;
            match key {
                "duration_s" => c.duration_s = parse_int(value)?,
                "lead_in_s" => c.lead_in_s = parse_int(value)?,
                "cue_delay_ms" => c.cue_delay_ms = parse_int(value)?,
                _ => return Err(ConfigErrorKind::UnknownKey),
            }
        }
    }
    Ok(())
}
