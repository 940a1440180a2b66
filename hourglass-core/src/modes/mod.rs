//! Built-in modes, in their default cycling order

pub mod battery;
pub mod lighting;
pub mod screen;
pub mod timer;

pub use battery::BatteryMode;
pub use lighting::LightingMode;
pub use screen::{ScreenMode, PALETTE};
pub use timer::{TimerMode, TimerPhase};

/// Number of built-in modes
pub const MODE_COUNT: usize = 4;
