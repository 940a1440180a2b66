//! Board-agnostic core logic for the Hourglass firmware
//!
//! Everything here runs the same on the device and on a host test runner:
//!
//! - Hardware abstraction traits (LED strip, motion sensor)
//! - Input sampling: button presses, long presses, shake and tilt
//! - The 8×8 matrix frame buffer, serpentine mapping and glyphs
//! - The mode lifecycle and controller
//! - The built-in timer, lighting, battery and screen-art modes
//! - Audio requests and power telemetry types
//! - Configuration types and the `device.toml` reader

#![no_std]
#![deny(unsafe_code)]

pub mod audio;
pub mod config;
pub mod input;
pub mod matrix;
pub mod mode;
pub mod modes;
pub mod power;
pub mod traits;
