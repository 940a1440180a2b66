//! Audio requests
//!
//! Modes never touch the audio driver. They post [`AudioMessage`]s through an
//! [`AudioSink`], and the audio task drains them in order.

use hourglass_protocol::{MAX_TRACK, MAX_VOLUME};

/// Requests consumed by the audio task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioMessage {
    Play,
    Pause,
    Stop,
    Next,
    /// Volume 0-30, clamped by the driver
    SetVolume(u8),
    /// Track 1-9999, clamped by the driver
    PlayTrack(u16),
    /// Random track other than the current one
    PlayRandom,
}

impl AudioMessage {
    /// Copy with arguments clamped into their valid ranges
    pub fn clamped(self) -> Self {
        match self {
            AudioMessage::SetVolume(v) => AudioMessage::SetVolume(v.min(MAX_VOLUME)),
            AudioMessage::PlayTrack(t) => AudioMessage::PlayTrack(t.clamp(1, MAX_TRACK)),
            other => other,
        }
    }
}

/// Player state as tracked by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerState {
    #[default]
    Idle,
    Playing,
    Paused,
    /// Async play-track sequence in progress
    Preparing,
    /// Async stop in progress
    Stopping,
}

/// Producer side of the audio queue
pub trait AudioSink {
    /// Enqueue without waiting; returns the message back if the queue is full
    fn try_send(&mut self, message: AudioMessage) -> Result<(), AudioMessage>;

    /// Discard everything still queued
    fn clear(&mut self);

    /// Best-effort send; a full queue drops the message
    ///
    /// Returns whether the message was queued.
    fn send(&mut self, message: AudioMessage) -> bool {
        self.try_send(message).is_ok()
    }

    /// Cut whatever is playing and start `track`
    ///
    /// Stale requests still queued are dropped first so the cue is not
    /// delayed behind them.
    fn stop_then_play(&mut self, track: u16) -> bool {
        self.clear();
        let stopped = self.send(AudioMessage::Stop);
        let started = self.send(AudioMessage::PlayTrack(track));
        stopped && started
    }
}
