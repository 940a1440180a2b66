//! Configuration types
//!
//! Board-agnostic settings loaded from `device.toml`. Every field has the
//! value the appliance ships with, so a missing or partial file still yields
//! a working device.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ConfigError, ConfigErrorKind};
pub use types::*;
