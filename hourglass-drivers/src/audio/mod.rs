//! Audio output

pub mod dispatch;
pub mod jq8900;

pub use dispatch::dispatch;
pub use jq8900::{AudioDeviceState, Jq8900, Jq8900Config};
