//! JQ8900 one-wire line encoding
//!
//! The module latches one byte per frame. Numeric arguments (volume, track
//! number, loop mode) are sent as separate decimal-digit bytes before the
//! opcode that consumes them.

/// Highest volume the module accepts
pub const MAX_VOLUME: u8 = 30;

/// Highest addressable track number
pub const MAX_TRACK: u16 = 9999;

/// Number of pulses in one encoded byte (guard + lead + 8 × 2 + idle)
pub const PULSES_PER_BYTE: usize = 19;

/// Command opcodes understood by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    /// Clear the digit accumulator
    Clear = 0x0A,
    /// Play the track whose number was just entered
    PlaySpecified = 0x0B,
    /// Apply the entered number as volume
    VolumeSet = 0x0C,
    /// Apply the entered number as loop mode
    LoopMode = 0x0E,
    /// Resume / start playback
    Play = 0x11,
    /// Pause playback
    Pause = 0x12,
    /// Stop playback
    Stop = 0x13,
    /// Skip to the next track
    Next = 0x15,
}

impl Opcode {
    /// Wire byte for this opcode
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Parse an opcode from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x0A => Some(Opcode::Clear),
            0x0B => Some(Opcode::PlaySpecified),
            0x0C => Some(Opcode::VolumeSet),
            0x0E => Some(Opcode::LoopMode),
            0x11 => Some(Opcode::Play),
            0x12 => Some(Opcode::Pause),
            0x13 => Some(Opcode::Stop),
            0x15 => Some(Opcode::Next),
            _ => None,
        }
    }
}

/// Playback loop behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopMode {
    /// Repeat the current track
    Single,
    /// Repeat the current folder
    Folder,
    /// Play once and stop
    #[default]
    Disabled,
}

impl LoopMode {
    /// Argument byte sent before [`Opcode::LoopMode`]
    pub const fn to_byte(self) -> u8 {
        match self {
            LoopMode::Single => 0x00,
            LoopMode::Folder => 0x01,
            LoopMode::Disabled => 0x02,
        }
    }
}

/// Pulse widths of the line, in microseconds
///
/// These are a hardware calibration: two sets have been seen working against
/// different module batches, and the receiver silently drops bytes when the
/// widths drift outside its tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseTiming {
    /// Idle-high time before the lead pulse
    pub guard_us: u32,
    /// Low lead pulse marking the start of a byte
    pub lead_us: u32,
    /// Long half of a bit (high part of "1", low part of "0")
    pub long_us: u32,
    /// Short half of a bit (low part of "1", high part of "0")
    pub short_us: u32,
}

impl PulseTiming {
    /// 3:1 duty cycle, 800 µs per bit
    pub const STANDARD: Self = Self {
        guard_us: 1000,
        lead_us: 4000,
        long_us: 600,
        short_us: 200,
    };

    /// Earlier calibration with a 710 µs bit period
    pub const LEGACY: Self = Self {
        guard_us: 1000,
        lead_us: 4000,
        long_us: 500,
        short_us: 210,
    };

    /// (high, low) durations for one data bit
    pub const fn bit(&self, one: bool) -> (u32, u32) {
        if one {
            (self.long_us, self.short_us)
        } else {
            (self.short_us, self.long_us)
        }
    }

    /// Total line time for one byte frame, including the trailing idle guard
    pub const fn frame_us(&self) -> u32 {
        2 * self.guard_us + self.lead_us + 8 * (self.long_us + self.short_us)
    }
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Named pulse timing sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulsePreset {
    Standard,
    Legacy,
}

impl PulsePreset {
    pub const fn timing(self) -> PulseTiming {
        match self {
            PulsePreset::Standard => PulseTiming::STANDARD,
            PulsePreset::Legacy => PulseTiming::LEGACY,
        }
    }
}

/// Line level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    High,
    Low,
}

/// Hold the line at `level` for `micros`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    pub level: Level,
    pub micros: u32,
}

impl Pulse {
    const fn high(micros: u32) -> Self {
        Self {
            level: Level::High,
            micros,
        }
    }

    const fn low(micros: u32) -> Self {
        Self {
            level: Level::Low,
            micros,
        }
    }
}

/// Encode one byte into its line waveform
///
/// Bits go out LSB first. The frame starts and ends idle-high.
pub fn encode_byte(byte: u8, timing: &PulseTiming) -> [Pulse; PULSES_PER_BYTE] {
    let mut pulses = [Pulse::high(0); PULSES_PER_BYTE];
    pulses[0] = Pulse::high(timing.guard_us);
    pulses[1] = Pulse::low(timing.lead_us);

    let mut data = byte;
    for bit in 0..8 {
        let (high, low) = timing.bit(data & 0x01 != 0);
        pulses[2 + bit * 2] = Pulse::high(high);
        pulses[3 + bit * 2] = Pulse::low(low);
        data >>= 1;
    }

    pulses[PULSES_PER_BYTE - 1] = Pulse::high(timing.guard_us);
    pulses
}

/// Decode a waveform produced by [`encode_byte`]
///
/// Used by tests and bench tooling to check captured line traces.
/// Returns `None` if the frame shape is wrong.
pub fn decode_pulses(pulses: &[Pulse], timing: &PulseTiming) -> Option<u8> {
    if pulses.len() != PULSES_PER_BYTE {
        return None;
    }
    if pulses[0].level != Level::High || pulses[1].level != Level::Low {
        return None;
    }

    let mut byte = 0u8;
    for bit in 0..8 {
        let high = pulses[2 + bit * 2];
        let low = pulses[3 + bit * 2];
        if high.level != Level::High || low.level != Level::Low {
            return None;
        }
        if high.micros > low.micros {
            byte |= 1 << bit;
        } else if (high.micros, low.micros) != timing.bit(false) {
            return None;
        }
    }

    Some(byte)
}
