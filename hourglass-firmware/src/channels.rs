//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.
//!
//! Event and audio queues are best-effort: producers use `try_send` and drop
//! on a full queue. Power telemetry and LED frames are single-slot signals
//! where the newest value replaces any unread one.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU32, Ordering};
use smart_leds::RGB8;

use hourglass_core::audio::AudioMessage;
use hourglass_core::input::Event;
use hourglass_core::matrix::LED_COUNT;
use hourglass_core::power::PowerSnapshot;
use hourglass_protocol::ScreenCommand;

/// Channel capacity for input events
const EVENT_CHANNEL_SIZE: usize = 10;

/// Channel capacity for audio requests
const AUDIO_CHANNEL_SIZE: usize = 5;

/// Channel capacity for received screen-art commands
const SCREEN_CHANNEL_SIZE: usize = 2;

/// Input events (producer: input task, consumer: mode task)
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Audio requests (producer: active mode, consumer: audio task)
pub static AUDIO_CHANNEL: Channel<CriticalSectionRawMutex, AudioMessage, AUDIO_CHANNEL_SIZE> =
    Channel::new();

/// Latest power telemetry (updated by sensor task)
pub static POWER_SNAPSHOT: Signal<CriticalSectionRawMutex, PowerSnapshot> = Signal::new();

/// One committed matrix frame, in physical strip order
#[derive(Clone, Copy)]
pub struct LedFrame {
    pub pixels: [RGB8; LED_COUNT],
    pub brightness: u8,
}

/// Frame ready for the strip (updated by mode task)
pub static LED_FRAME: Signal<CriticalSectionRawMutex, LedFrame> = Signal::new();

/// Screen-art commands from the host (producer: screen RX task)
pub static SCREEN_COMMANDS: Channel<CriticalSectionRawMutex, ScreenCommand, SCREEN_CHANNEL_SIZE> =
    Channel::new();

/// Screen-art session state change (true = host connected)
pub static SCREEN_SESSION: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Events dropped because the event queue was full
pub static DROPPED_EVENTS: AtomicU32 = AtomicU32::new(0);

/// Audio requests dropped because the audio queue was full
pub static DROPPED_AUDIO: AtomicU32 = AtomicU32::new(0);

/// Count one dropped send
pub fn note_dropped(counter: &AtomicU32) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Current drop counters (events, audio)
pub fn dropped_counts() -> (u32, u32) {
    (
        DROPPED_EVENTS.load(Ordering::Relaxed),
        DROPPED_AUDIO.load(Ordering::Relaxed),
    )
}
