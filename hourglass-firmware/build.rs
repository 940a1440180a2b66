//! Build script for hourglass-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml at compile time
///
/// The firmware parses the same file at boot and falls back to defaults on
/// error, so anything caught here would otherwise only show up as a log line.
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a device.toml configuration file.           ║\n\
            ║  Please create one in the hourglass-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_known_keys(&config, &mut errors);
    validate_audio(&config, &mut errors);
    validate_periods(&config, &mut errors);
    validate_timer(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sections and keys the firmware's reader accepts
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    (
        "input",
        &[
            "tick_ms",
            "long_press_ms",
            "shake_threshold_mg",
            "shake_cooldown_ms",
            "tilt_enabled",
            "tilt_enter_mg",
            "tilt_exit_mg",
        ],
    ),
    (
        "audio",
        &[
            "volume",
            "loop_mode",
            "max_tracks",
            "min_interval_ms",
            "receive_timeout_ms",
            "mutex_wait_ms",
            "pulse",
        ],
    ),
    ("matrix", &["brightness"]),
    ("sensor", &["period_ms", "battery_empty_mv", "battery_full_mv"]),
    ("modes", &["tick_ms", "screen_session_timeout_ms"]),
    ("timer", &["duration_s", "lead_in_s", "cue_delay_ms"]),
];

const PULSE_KEYS: &[&str] = &["preset", "guard_us", "lead_us", "long_us", "short_us"];

fn validate_known_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (section, value) in root {
        let Some((_, keys)) = KNOWN_KEYS.iter().find(|(name, _)| name == section) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", section, key));
            }
        }
    }

    if let Some(pulse) = config.get("audio").and_then(|a| a.get("pulse")) {
        match pulse.as_table() {
            Some(table) => {
                for key in table.keys() {
                    if !PULSE_KEYS.contains(&key.as_str()) {
                        errors.push(format!("[audio.pulse] unknown key '{}'", key));
                    }
                }
            }
            None => errors.push("[audio.pulse] must be a table".to_string()),
        }
    }
}

fn int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn validate_audio(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(volume) = int(config, "audio", "volume") {
        if !(0..=30).contains(&volume) {
            errors.push("[audio] volume must be 0-30".to_string());
        }
    }

    if let Some(tracks) = int(config, "audio", "max_tracks") {
        if !(1..=9999).contains(&tracks) {
            errors.push("[audio] max_tracks must be 1-9999".to_string());
        }
    }

    if let Some(mode) = config.get("audio").and_then(|a| a.get("loop_mode")) {
        match mode.as_str() {
            Some("single" | "folder" | "disabled" | "off") => {}
            _ => errors.push(
                "[audio] loop_mode must be 'single', 'folder' or 'disabled'".to_string(),
            ),
        }
    }

    if let Some(pulse) = config.get("audio").and_then(|a| a.get("pulse")) {
        if let Some(preset) = pulse.get("preset") {
            if !matches!(preset.as_str(), Some("standard" | "legacy")) {
                errors.push("[audio.pulse] preset must be 'standard' or 'legacy'".to_string());
            }
        }
        for key in ["guard_us", "lead_us", "long_us", "short_us"] {
            if let Some(v) = pulse.get(key).and_then(|v| v.as_integer()) {
                if v <= 0 {
                    errors.push(format!("[audio.pulse] {} must be positive", key));
                }
            }
        }

        // Widths not given fall back to the preset, as in the firmware reader
        let (preset_long, preset_short) = match pulse.get("preset").and_then(|p| p.as_str()) {
            Some("legacy") => (500, 210),
            _ => (600, 200),
        };
        let width = |key: &str, default: i64| {
            pulse.get(key).and_then(|v| v.as_integer()).unwrap_or(default)
        };
        if width("long_us", preset_long) <= width("short_us", preset_short) {
            errors.push("[audio.pulse] long_us must exceed short_us".to_string());
        }
    }

    if let Some(interval) = int(config, "audio", "min_interval_ms") {
        if interval < MIN_STEP_INTERVAL_MS {
            errors.push(format!(
                "[audio] min_interval_ms must be at least {}",
                MIN_STEP_INTERVAL_MS
            ));
        }
    }
}

/// The audio module needs this long to latch one byte
const MIN_STEP_INTERVAL_MS: i64 = 10;

fn validate_periods(config: &toml::Value, errors: &mut Vec<String>) {
    let periods = [
        ("input", "tick_ms"),
        ("audio", "receive_timeout_ms"),
        ("audio", "mutex_wait_ms"),
        ("sensor", "period_ms"),
        ("modes", "tick_ms"),
    ];
    for (section, key) in periods {
        if let Some(v) = int(config, section, key) {
            if v <= 0 {
                errors.push(format!("[{}] {} must be non-zero", section, key));
            }
        }
    }

    if let (Some(empty), Some(full)) = (
        int(config, "sensor", "battery_empty_mv"),
        int(config, "sensor", "battery_full_mv"),
    ) {
        if full <= empty {
            errors.push("[sensor] battery_full_mv must exceed battery_empty_mv".to_string());
        }
    }
}

fn validate_timer(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(d) = int(config, "timer", "duration_s") {
        if !(1..=99).contains(&d) {
            errors.push("[timer] duration_s must be 1-99".to_string());
        }
    }
    if let Some(l) = int(config, "timer", "lead_in_s") {
        if !(1..=9).contains(&l) {
            errors.push("[timer] lead_in_s must be 1-9".to_string());
        }
    }
}
