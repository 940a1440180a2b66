//! Command sequences for the audio module
//!
//! A [`Sequence`] is the ordered list of bytes making up one logical command,
//! each paired with the settle time the module needs before the next byte.

use heapless::Vec;

use crate::audio::{LoopMode, Opcode, MAX_TRACK, MAX_VOLUME};

/// Settle after a digit or CLEAR byte
pub const BYTE_SETTLE_MS: u32 = 10;

/// Settle after the opcode that completes a command
pub const COMMAND_SETTLE_MS: u32 = 50;

/// Settle after STOP before anything else is sent
pub const STOP_SETTLE_MS: u32 = 30;

/// Longest sequence: CLEAR + 4 digits + PLAY_SPECIFIED
pub const MAX_STEPS: usize = 6;

/// One byte on the line plus its settle time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    pub byte: u8,
    pub settle_ms: u32,
}

impl Step {
    pub const fn new(byte: u8, settle_ms: u32) -> Self {
        Self { byte, settle_ms }
    }
}

/// Ordered byte steps for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    steps: Vec<Step, MAX_STEPS>,
}

/// Decimal digits of a track number, most significant first
pub fn track_digits(track: u16) -> [u8; 4] {
    let track = track.min(MAX_TRACK);
    [
        (track / 1000 % 10) as u8,
        (track / 100 % 10) as u8,
        (track / 10 % 10) as u8,
        (track % 10) as u8,
    ]
}

impl Sequence {
    fn from_steps(steps: &[Step]) -> Self {
        let mut seq = Self { steps: Vec::new() };
        for step in steps {
            // Builders never exceed MAX_STEPS
            let _ = seq.steps.push(*step);
        }
        seq
    }

    fn single(op: Opcode, settle_ms: u32) -> Self {
        Self::from_steps(&[Step::new(op.to_byte(), settle_ms)])
    }

    /// CLEAR, tens, ones, VOLUME_SET. Volume is clamped to 30.
    pub fn set_volume(volume: u8) -> Self {
        let volume = volume.min(MAX_VOLUME);
        Self::from_steps(&[
            Step::new(Opcode::Clear.to_byte(), BYTE_SETTLE_MS),
            Step::new(volume / 10, BYTE_SETTLE_MS),
            Step::new(volume % 10, BYTE_SETTLE_MS),
            Step::new(Opcode::VolumeSet.to_byte(), COMMAND_SETTLE_MS),
        ])
    }

    /// CLEAR, mode, LOOP_MODE
    pub fn set_loop_mode(mode: LoopMode) -> Self {
        Self::from_steps(&[
            Step::new(Opcode::Clear.to_byte(), BYTE_SETTLE_MS),
            Step::new(mode.to_byte(), BYTE_SETTLE_MS),
            Step::new(Opcode::LoopMode.to_byte(), COMMAND_SETTLE_MS),
        ])
    }

    /// CLEAR, four decimal digits, PLAY_SPECIFIED. Track is clamped to 1..=9999.
    pub fn play_track(track: u16) -> Self {
        let digits = track_digits(track.clamp(1, MAX_TRACK));
        Self::from_steps(&[
            Step::new(Opcode::Clear.to_byte(), BYTE_SETTLE_MS),
            Step::new(digits[0], BYTE_SETTLE_MS),
            Step::new(digits[1], BYTE_SETTLE_MS),
            Step::new(digits[2], BYTE_SETTLE_MS),
            Step::new(digits[3], BYTE_SETTLE_MS),
            Step::new(Opcode::PlaySpecified.to_byte(), COMMAND_SETTLE_MS),
        ])
    }

    pub fn stop() -> Self {
        Self::single(Opcode::Stop, STOP_SETTLE_MS)
    }

    pub fn play() -> Self {
        Self::single(Opcode::Play, COMMAND_SETTLE_MS)
    }

    pub fn pause() -> Self {
        Self::single(Opcode::Pause, COMMAND_SETTLE_MS)
    }

    pub fn next() -> Self {
        Self::single(Opcode::Next, COMMAND_SETTLE_MS)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step at `index`, used by the non-blocking sequencer
    pub fn step(&self, index: usize) -> Option<Step> {
        self.steps.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Bytes only, without settle times
    pub fn bytes(&self) -> Vec<u8, MAX_STEPS> {
        self.steps.iter().map(|s| s.byte).collect()
    }

    /// Sum of all settle delays
    pub fn total_settle_ms(&self) -> u32 {
        self.steps.iter().map(|s| s.settle_ms).sum()
    }
}
