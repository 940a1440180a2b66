//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod audio;
pub mod input;
pub mod led;
pub mod mode;
pub mod screen_rx;
pub mod sensor;

pub use audio::audio_task;
pub use input::{input_task, Buttons};
pub use led::{led_task, MatrixStrip};
pub use mode::mode_task;
pub use screen_rx::screen_rx_task;
pub use sensor::{sensor_task, PowerInputs};
