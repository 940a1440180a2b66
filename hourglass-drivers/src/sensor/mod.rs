//! Sensor drivers

pub mod mpu6886;

pub use mpu6886::{AccelRange, Mpu6886};
