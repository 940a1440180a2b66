//! Hourglass wire formats
//!
//! This crate defines the two byte-level protocols the appliance speaks:
//!
//! - The one-wire command line to the JQ8900 audio module. There is no
//!   acknowledgement channel, so every byte is sent as a fixed pulse-width
//!   waveform and followed by a settle delay the module needs to latch it.
//! - The screen-art frame format received from a host over UART, either as
//!   binary frames or as text lines.
//!
//! # Audio line overview
//!
//! Each command byte is framed as:
//! ```text
//!  guard   lead        bit 0 (LSB)       ...  bit 7          idle
//! ┌──────┐          ┌────┐    ┌──┐           ┌────┐    ┌──────────
//! │ high │   low    │ 1  │ lo │0 │   lo      │    │ lo │  high
//! ┘      └──────────┘    └────┘  └─────────  ┘    └────┘
//! ```
//! A "1" bit is long-high/short-low, a "0" bit is short-high/long-low.
//!
//! Nothing here touches hardware; drivers turn [`audio::Pulse`] lists into pin
//! toggles and busy-wait delays.

#![no_std]
#![deny(unsafe_code)]

pub mod audio;
pub mod frame;
pub mod sequence;
pub mod text;

pub use audio::{
    decode_pulses, encode_byte, Level, LoopMode, Opcode, Pulse, PulsePreset, PulseTiming,
    MAX_TRACK, MAX_VOLUME, PULSES_PER_BYTE,
};
pub use frame::{
    FrameError, FrameParser, PixelFrame, FRAME_HEADER, FRAME_SIZE, FRAME_WIDTH, PIXEL_COUNT,
};
pub use sequence::{track_digits, Sequence, Step};
pub use text::{LineError, LineParser, ScreenCommand, ScreenDecoder, ScreenError};
