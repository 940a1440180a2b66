//! Display modes and their lifecycle
//!
//! Exactly one mode is active at a time. The mode task owns the
//! [`ModeController`] and builds a fresh [`ModeContext`] every tick, so modes
//! borrow the frame buffer, strip and audio queue only while they run.

pub mod controller;

pub use controller::{ModeController, ModeId, Transition};

use hourglass_protocol::ScreenCommand;
use rand::RngCore;

use crate::audio::AudioSink;
use crate::input::Event;
use crate::matrix::FrameBuffer;
use crate::power::PowerSnapshot;
use crate::traits::LedStrip;

/// Everything a mode may touch during one call
pub struct ModeContext<'a> {
    /// Cached matrix contents
    pub matrix: &'a mut FrameBuffer,
    /// Physical strip, for flushing and brightness
    pub strip: &'a mut dyn LedStrip,
    /// Audio request queue
    pub audio: &'a mut dyn AudioSink,
    /// Randomness for color and track picks
    pub rng: &'a mut dyn RngCore,
    /// Monotonic time of this tick
    pub now_ms: u64,
    /// Latest power telemetry, if any has been published
    pub power: Option<PowerSnapshot>,
    /// Screen-art command received since the last tick
    pub remote: Option<ScreenCommand>,
}

impl ModeContext<'_> {
    /// Commit pending matrix changes to the strip
    pub fn flush(&mut self) -> usize {
        self.matrix.update(&mut *self.strip)
    }

    /// Change the strip brightness and make sure it is applied
    pub fn set_brightness(&mut self, brightness: u8) {
        self.strip.set_brightness(brightness);
        self.matrix.request_show();
    }
}

/// A self-contained display and interaction behavior
///
/// `begin` and `exit` always come in pairs; the controller never calls
/// `begin` on a second mode before `exit` on the first.
pub trait Mode {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Mode became active
    fn begin(&mut self, cx: &mut ModeContext<'_>);

    /// Periodic refresh, once per mode tick after event dispatch
    fn update(&mut self, cx: &mut ModeContext<'_>);

    /// Mode is about to be replaced
    fn exit(&mut self, cx: &mut ModeContext<'_>);

    /// Input event not consumed by the controller
    fn handle_event(&mut self, event: Event, cx: &mut ModeContext<'_>);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audio::tests::QueueSink;
    use crate::matrix::buffer::tests::RecordingStrip;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Owned collaborators for driving modes in tests
    pub(crate) struct Rig {
        pub matrix: FrameBuffer,
        pub strip: RecordingStrip,
        pub audio: QueueSink<16>,
        pub rng: SmallRng,
        pub now_ms: u64,
        pub power: Option<PowerSnapshot>,
        pub remote: Option<ScreenCommand>,
    }

    impl Rig {
        pub fn new() -> Self {
            Self {
                matrix: FrameBuffer::new(),
                strip: RecordingStrip::default(),
                audio: QueueSink::new(),
                rng: SmallRng::seed_from_u64(7),
                now_ms: 0,
                power: None,
                remote: None,
            }
        }

        pub fn cx(&mut self) -> ModeContext<'_> {
            ModeContext {
                matrix: &mut self.matrix,
                strip: &mut self.strip,
                audio: &mut self.audio,
                rng: &mut self.rng,
                now_ms: self.now_ms,
                power: self.power,
                remote: self.remote.take(),
            }
        }
    }

    #[test]
    fn test_flush_goes_through_strip() {
        let mut rig = Rig::new();
        let mut cx = rig.cx();
        cx.matrix.set_pixel(0, 0, crate::matrix::RED);
        assert_eq!(cx.flush(), 1);
        assert_eq!(rig.strip.shows, 1);
    }

    #[test]
    fn test_brightness_forces_show() {
        let mut rig = Rig::new();
        {
            let mut cx = rig.cx();
            cx.flush();
            cx.set_brightness(7);
            cx.flush();
        }
        assert_eq!(rig.strip.brightness, 7);
        assert_eq!(rig.strip.shows, 2);
    }
}
