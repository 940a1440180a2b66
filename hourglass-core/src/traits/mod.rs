//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod led;
pub mod motion;

pub use led::LedStrip;
pub use motion::{Acceleration, MotionError, MotionSensor};
