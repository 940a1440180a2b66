//! JQ8900 voice module over its one-wire control line
//!
//! The module listens on a single idle-high GPIO. Each byte is a guard high,
//! a lead low, then eight pulse-width coded bits LSB first (see
//! [`hourglass_protocol::encode_byte`]). Numeric arguments are sent as
//! decimal digit bytes between a CLEAR and the command that consumes them.
//!
//! The line is open loop: there is no acknowledgement, so a byte sent too soon
//! after the previous one is silently ignored by the module. Every helper here
//! therefore waits out the settle time of each step.
//!
//! # Blocking and stepped operation
//!
//! The blocking calls ([`Jq8900::play_track`], [`Jq8900::set_volume`], ...)
//! transmit a whole [`Sequence`] and return after its last settle delay, which
//! can take a few hundred milliseconds.
//!
//! [`Jq8900::play_track_async`] and [`Jq8900::stop_async`] only arm a step
//! sequencer. Each later [`Jq8900::update`] call sends at most one byte, and
//! only once `min_interval_ms` has passed since the previous one, so a polling
//! task never blocks for more than a single byte frame.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use hourglass_core::audio::PlayerState;
use hourglass_protocol::sequence::BYTE_SETTLE_MS;
use hourglass_protocol::{encode_byte, Level, LoopMode, Opcode, PulseTiming, Sequence, MAX_TRACK};
use rand::{Rng, RngCore};

/// Settle time between the blocking stop and the track selection
const STOP_TO_SELECT_MS: u32 = 50;

/// Pin self-test toggles on [`Jq8900::begin`]
const SELF_TEST_TOGGLES: usize = 3;
const SELF_TEST_HALF_PERIOD_MS: u32 = 50;

/// Time the module needs after power-up before it accepts commands
const BOOT_WAIT_MS: u32 = 500;

/// Driver tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Jq8900Config {
    /// Waveform calibration
    pub timing: PulseTiming,
    /// Tracks stored on the module (1-9999)
    pub max_tracks: u16,
    /// Minimum gap between two bytes of a stepped sequence
    pub min_interval_ms: u64,
}

impl Default for Jq8900Config {
    fn default() -> Self {
        Self {
            timing: PulseTiming::STANDARD,
            max_tracks: 9,
            min_interval_ms: 20,
        }
    }
}

/// Player bookkeeping
///
/// Only the audio task holds this; it is never shared outside the audio
/// device lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioDeviceState {
    /// Last track selected (1-based)
    pub current_track: u16,
    pub player_state: PlayerState,
    /// Track the stepped sequencer is selecting
    pub pending_track: u16,
    /// Next step of the stepped sequencer
    pub cmd_step: u8,
    /// When the stepped sequencer last armed or sent
    pub last_cmd_ms: u64,
}

impl Default for AudioDeviceState {
    fn default() -> Self {
        Self {
            current_track: 1,
            player_state: PlayerState::Idle,
            pending_track: 0,
            cmd_step: 0,
            last_cmd_ms: 0,
        }
    }
}

/// JQ8900 driver over an output pin and a blocking delay
pub struct Jq8900<P, D> {
    pin: P,
    delay: D,
    config: Jq8900Config,
    state: AudioDeviceState,
}

impl<P: OutputPin, D: DelayNs> Jq8900<P, D> {
    pub fn new(pin: P, delay: D, config: Jq8900Config) -> Self {
        let config = Jq8900Config {
            max_tracks: config.max_tracks.clamp(1, MAX_TRACK),
            min_interval_ms: config.min_interval_ms.max(u64::from(BYTE_SETTLE_MS)),
            ..config
        };
        Self {
            pin,
            delay,
            config,
            state: AudioDeviceState::default(),
        }
    }

    pub fn config(&self) -> &Jq8900Config {
        &self.config
    }

    pub fn state(&self) -> &AudioDeviceState {
        &self.state
    }

    pub fn player_state(&self) -> PlayerState {
        self.state.player_state
    }

    pub fn current_track(&self) -> u16 {
        self.state.current_track
    }

    /// A stepped sequence still has bytes to send
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state.player_state,
            PlayerState::Preparing | PlayerState::Stopping
        )
    }

    /// Release the pin and delay
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    /// Drive the line idle, toggle it as a self-test, then wait for the
    /// module to boot
    pub fn begin(&mut self) -> Result<(), P::Error> {
        self.pin.set_high()?;
        for _ in 0..SELF_TEST_TOGGLES {
            self.pin.set_low()?;
            self.delay.delay_ms(SELF_TEST_HALF_PERIOD_MS);
            self.pin.set_high()?;
            self.delay.delay_ms(SELF_TEST_HALF_PERIOD_MS);
        }
        self.delay.delay_ms(BOOT_WAIT_MS);
        Ok(())
    }

    /// Transmit one byte frame; the line is left high
    pub fn send_byte(&mut self, byte: u8) -> Result<(), P::Error> {
        for pulse in encode_byte(byte, &self.config.timing) {
            match pulse.level {
                Level::High => self.pin.set_high()?,
                Level::Low => self.pin.set_low()?,
            }
            self.delay.delay_us(pulse.micros);
        }
        Ok(())
    }

    /// Transmit every step of `sequence`, waiting out each settle time
    pub fn run(&mut self, sequence: &Sequence) -> Result<(), P::Error> {
        for step in sequence.steps() {
            self.send_byte(step.byte)?;
            self.delay.delay_ms(step.settle_ms);
        }
        Ok(())
    }

    /// Set the output volume (clamped to 0-30)
    pub fn set_volume(&mut self, volume: u8) -> Result<(), P::Error> {
        self.run(&Sequence::set_volume(volume))
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) -> Result<(), P::Error> {
        self.run(&Sequence::set_loop_mode(mode))
    }

    /// Stop playback, abandoning any stepped sequence
    pub fn stop(&mut self) -> Result<(), P::Error> {
        self.run(&Sequence::stop())?;
        self.state.player_state = PlayerState::Idle;
        self.state.cmd_step = 0;
        Ok(())
    }

    pub fn play(&mut self) -> Result<(), P::Error> {
        self.run(&Sequence::play())?;
        self.state.player_state = PlayerState::Playing;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), P::Error> {
        self.run(&Sequence::pause())?;
        self.state.player_state = PlayerState::Paused;
        Ok(())
    }

    /// Skip to the next track, wrapping after `max_tracks`
    pub fn next(&mut self) -> Result<(), P::Error> {
        self.run(&Sequence::next())?;
        self.state.current_track = if self.state.current_track >= self.config.max_tracks {
            1
        } else {
            self.state.current_track + 1
        };
        self.state.player_state = PlayerState::Playing;
        Ok(())
    }

    /// Stop, then select and start `track` (clamped to 1-9999)
    pub fn play_track(&mut self, track: u16) -> Result<(), P::Error> {
        let track = track.clamp(1, MAX_TRACK);
        self.state.current_track = track;
        self.stop()?;
        self.delay.delay_ms(STOP_TO_SELECT_MS);
        self.run(&Sequence::play_track(track))?;
        self.state.player_state = PlayerState::Playing;
        Ok(())
    }

    /// Arm the stepped sequencer to select `track`
    ///
    /// Replaces any stepped sequence in progress.
    pub fn play_track_async(&mut self, track: u16, now_ms: u64) {
        let track = track.clamp(1, MAX_TRACK);
        self.state.pending_track = track;
        self.state.current_track = track;
        self.state.player_state = PlayerState::Preparing;
        self.state.cmd_step = 0;
        self.state.last_cmd_ms = now_ms;
    }

    /// Arm the stepped sequencer to stop; no-op while already stopping
    pub fn stop_async(&mut self, now_ms: u64) {
        if self.state.player_state != PlayerState::Stopping {
            self.state.player_state = PlayerState::Stopping;
            self.state.cmd_step = 0;
            self.state.last_cmd_ms = now_ms;
        }
    }

    /// Pick a random track other than the current one and select it stepwise
    ///
    /// With a single track there is nothing else to pick, so track 1 is
    /// selected again.
    pub fn play_random<R: RngCore + ?Sized>(&mut self, rng: &mut R, now_ms: u64) -> u16 {
        let max = self.config.max_tracks;
        let mut track = rng.gen_range(1..=max);
        while max > 1 && track == self.state.current_track {
            track = rng.gen_range(1..=max);
        }
        self.play_track_async(track, now_ms);
        track
    }

    /// Advance the stepped sequencer by at most one byte
    ///
    /// Returns the byte sent, if any.
    pub fn update(&mut self, now_ms: u64) -> Result<Option<u8>, P::Error> {
        if !self.is_busy() {
            return Ok(None);
        }
        if now_ms.saturating_sub(self.state.last_cmd_ms) < self.config.min_interval_ms {
            return Ok(None);
        }

        match self.state.player_state {
            PlayerState::Preparing => {
                let sequence = Sequence::play_track(self.state.pending_track);
                let Some(step) = sequence.step(usize::from(self.state.cmd_step)) else {
                    self.finish(PlayerState::Playing);
                    return Ok(None);
                };
                self.send_byte(step.byte)?;
                self.state.last_cmd_ms = now_ms;
                self.state.cmd_step += 1;
                if usize::from(self.state.cmd_step) == sequence.len() {
                    self.finish(PlayerState::Playing);
                }
                Ok(Some(step.byte))
            }
            PlayerState::Stopping => {
                if self.state.cmd_step == 0 {
                    let byte = Opcode::Stop.to_byte();
                    self.send_byte(byte)?;
                    self.state.last_cmd_ms = now_ms;
                    self.state.cmd_step = 1;
                    Ok(Some(byte))
                } else {
                    self.finish(PlayerState::Idle);
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    fn finish(&mut self, state: PlayerState) {
        self.state.player_state = state;
        self.state.cmd_step = 0;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use hourglass_protocol::decode_pulses;
    use hourglass_protocol::Pulse;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// One recorded line action
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum Op {
        High,
        Low,
        Us(u32),
        Ms(u32),
    }

    pub(crate) type Log = RefCell<heapless::Vec<Op, 4096>>;

    pub(crate) struct MockPin<'a>(pub &'a Log);

    impl embedded_hal::digital::ErrorType for MockPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockPin<'_> {
        fn set_high(&mut self) -> Result<(), Infallible> {
            let _ = self.0.borrow_mut().push(Op::High);
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Infallible> {
            let _ = self.0.borrow_mut().push(Op::Low);
            Ok(())
        }
    }

    pub(crate) struct MockDelay<'a>(pub &'a Log);

    impl DelayNs for MockDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            let _ = self.0.borrow_mut().push(Op::Us(ns / 1000));
        }

        fn delay_us(&mut self, us: u32) {
            let _ = self.0.borrow_mut().push(Op::Us(us));
        }

        fn delay_ms(&mut self, ms: u32) {
            let _ = self.0.borrow_mut().push(Op::Ms(ms));
        }
    }

    pub(crate) fn player(log: &Log) -> Jq8900<MockPin<'_>, MockDelay<'_>> {
        Jq8900::new(MockPin(log), MockDelay(log), Jq8900Config::default())
    }

    /// Decode the recorded waveform back into (byte, settle_ms) pairs
    ///
    /// A settle of 0 means the next byte followed without a millisecond wait.
    pub(crate) fn transmitted(log: &Log) -> heapless::Vec<(u8, u32), 64> {
        let ops = log.borrow();
        let timing = PulseTiming::STANDARD;
        let mut out = heapless::Vec::new();
        let mut pulses: heapless::Vec<Pulse, 32> = heapless::Vec::new();
        let mut level = None;

        for op in ops.iter() {
            match *op {
                Op::High => level = Some(Level::High),
                Op::Low => level = Some(Level::Low),
                Op::Us(us) => {
                    if let Some(level) = level {
                        let _ = pulses.push(Pulse { level, micros: us });
                    }
                    if pulses.len() == hourglass_protocol::PULSES_PER_BYTE {
                        if let Some(byte) = decode_pulses(&pulses, &timing) {
                            let _ = out.push((byte, 0));
                        }
                        pulses.clear();
                    }
                }
                Op::Ms(ms) => {
                    if let Some(last) = out.last_mut() {
                        last.1 += ms;
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_send_byte_waveform() {
        let log = Log::default();
        let mut p = player(&log);
        p.send_byte(0x01).unwrap();

        let ops = log.borrow();
        assert_eq!(ops.len(), 38);
        assert_eq!(&ops[..4], &[Op::High, Op::Us(1000), Op::Low, Op::Us(4000)]);
        // Bit 0 is a one, bit 1 a zero
        assert_eq!(&ops[4..8], &[Op::High, Op::Us(600), Op::Low, Op::Us(200)]);
        assert_eq!(&ops[8..12], &[Op::High, Op::Us(200), Op::Low, Op::Us(600)]);
        assert_eq!(&ops[36..], &[Op::High, Op::Us(1000)]);
    }

    #[test]
    fn test_legacy_timing() {
        let log = Log::default();
        let config = Jq8900Config {
            timing: PulseTiming::LEGACY,
            ..Jq8900Config::default()
        };
        let mut p = Jq8900::new(MockPin(&log), MockDelay(&log), config);
        p.send_byte(0x01).unwrap();
        assert_eq!(
            &log.borrow()[4..8],
            &[Op::High, Op::Us(500), Op::Low, Op::Us(210)]
        );
    }

    #[test]
    fn test_begin_self_test() {
        let log = Log::default();
        let mut p = player(&log);
        p.begin().unwrap();

        let ops = log.borrow();
        assert_eq!(ops[0], Op::High);
        let toggles = ops.iter().filter(|op| **op == Op::Low).count();
        assert_eq!(toggles, 3);
        assert_eq!(ops.last(), Some(&Op::Ms(500)));
        // Line ends idle high
        assert_eq!(ops.iter().rev().find(|op| matches!(op, Op::High | Op::Low)), Some(&Op::High));
    }

    #[test]
    fn test_set_volume_sequence() {
        let log = Log::default();
        let mut p = player(&log);
        p.set_volume(25).unwrap();
        assert_eq!(
            transmitted(&log).as_slice(),
            &[(0x0A, 10), (2, 10), (5, 10), (0x0C, 50)]
        );
    }

    #[test]
    fn test_volume_clamped() {
        let log = Log::default();
        let mut p = player(&log);
        p.set_volume(99).unwrap();
        assert_eq!(
            transmitted(&log).as_slice(),
            &[(0x0A, 10), (3, 10), (0, 10), (0x0C, 50)]
        );
    }

    #[test]
    fn test_loop_mode_sequence() {
        let log = Log::default();
        let mut p = player(&log);
        p.set_loop_mode(LoopMode::Disabled).unwrap();
        assert_eq!(
            transmitted(&log).as_slice(),
            &[(0x0A, 10), (2, 10), (0x0E, 50)]
        );
    }

    #[test]
    fn test_blocking_play_track() {
        let log = Log::default();
        let mut p = player(&log);
        p.play_track(1234).unwrap();
        assert_eq!(
            transmitted(&log).as_slice(),
            &[
                (0x13, 30 + 50),
                (0x0A, 10),
                (1, 10),
                (2, 10),
                (3, 10),
                (4, 10),
                (0x0B, 50)
            ]
        );
        assert_eq!(p.player_state(), PlayerState::Playing);
        assert_eq!(p.current_track(), 1234);
    }

    #[test]
    fn test_transport_commands() {
        let log = Log::default();
        let mut p = player(&log);

        p.play().unwrap();
        assert_eq!(p.player_state(), PlayerState::Playing);
        p.pause().unwrap();
        assert_eq!(p.player_state(), PlayerState::Paused);
        p.stop().unwrap();
        assert_eq!(p.player_state(), PlayerState::Idle);

        assert_eq!(
            transmitted(&log).as_slice(),
            &[(0x11, 50), (0x12, 50), (0x13, 30)]
        );
    }

    #[test]
    fn test_next_wraps() {
        let log = Log::default();
        let mut p = player(&log);
        p.play_track(9).unwrap();
        p.next().unwrap();
        assert_eq!(p.current_track(), 1);
        p.next().unwrap();
        assert_eq!(p.current_track(), 2);
        assert_eq!(p.player_state(), PlayerState::Playing);
    }

    #[test]
    fn test_async_play_track_steps() {
        let log = Log::default();
        let mut p = player(&log);
        p.play_track_async(1234, 100);
        assert_eq!(p.player_state(), PlayerState::Preparing);

        // Too soon after arming
        assert_eq!(p.update(110).unwrap(), None);

        let mut sent = heapless::Vec::<u8, 8>::new();
        let mut now = 100;
        while p.is_busy() {
            now += 20;
            if let Some(byte) = p.update(now).unwrap() {
                sent.push(byte).unwrap();
            }
            // Immediate retry is rate limited
            assert_eq!(p.update(now + 5).unwrap(), None);
        }

        assert_eq!(sent.as_slice(), &[0x0A, 1, 2, 3, 4, 0x0B]);
        assert_eq!(p.player_state(), PlayerState::Playing);
        assert_eq!(p.current_track(), 1234);
        assert_eq!(now, 100 + 6 * 20);
        // No settle waits inside the stepped path
        assert!(!log.borrow().iter().any(|op| matches!(op, Op::Ms(_))));
    }

    #[test]
    fn test_async_stop_two_updates() {
        let log = Log::default();
        let mut p = player(&log);
        p.play_track_async(3, 0);
        p.update(20).unwrap();

        p.stop_async(25);
        assert_eq!(p.player_state(), PlayerState::Stopping);
        // Second request keeps the original arm time
        p.stop_async(40);
        assert_eq!(p.state().last_cmd_ms, 25);

        assert_eq!(p.update(45).unwrap(), Some(0x13));
        assert_eq!(p.player_state(), PlayerState::Stopping);
        assert_eq!(p.update(65).unwrap(), None);
        assert_eq!(p.player_state(), PlayerState::Idle);
    }

    #[test]
    fn test_zero_interval_still_spaced() {
        let log = Log::default();
        let config = Jq8900Config {
            min_interval_ms: 0,
            ..Jq8900Config::default()
        };
        let mut p = Jq8900::new(MockPin(&log), MockDelay(&log), config);
        assert_eq!(p.config().min_interval_ms, 10);

        p.play_track_async(1234, 100);
        let mut sent = heapless::Vec::<u8, 8>::new();
        for _ in 0..7 {
            if let Some(byte) = p.update(100).unwrap() {
                sent.push(byte).unwrap();
            }
        }
        assert!(sent.is_empty());

        assert_eq!(p.update(110).unwrap(), Some(0x0A));
        assert_eq!(p.update(110).unwrap(), None);
        assert_eq!(p.update(120).unwrap(), Some(1));
    }

    #[test]
    fn test_update_idle_sends_nothing() {
        let log = Log::default();
        let mut p = player(&log);
        assert_eq!(p.update(1000).unwrap(), None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_play_random_avoids_current() {
        let log = Log::default();
        let mut p = player(&log);
        let mut rng = SmallRng::seed_from_u64(42);
        for i in 0..50 {
            let before = p.current_track();
            let track = p.play_random(&mut rng, i * 1000);
            assert_ne!(track, before);
            assert!((1..=9).contains(&track));
            assert_eq!(p.player_state(), PlayerState::Preparing);
        }
    }

    #[test]
    fn test_play_random_single_track() {
        let log = Log::default();
        let config = Jq8900Config {
            max_tracks: 1,
            ..Jq8900Config::default()
        };
        let mut p = Jq8900::new(MockPin(&log), MockDelay(&log), config);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(p.play_random(&mut rng, 0), 1);
        assert_eq!(p.state().pending_track, 1);
    }

    proptest::proptest! {
        #[test]
        fn test_play_random_in_range(max in 1u16..=40, seed: u64, rounds in 1usize..20) {
            let log = Log::default();
            let config = Jq8900Config { max_tracks: max, ..Jq8900Config::default() };
            let mut p = Jq8900::new(MockPin(&log), MockDelay(&log), config);
            let mut rng = SmallRng::seed_from_u64(seed);
            for i in 0..rounds {
                let before = p.current_track();
                let track = p.play_random(&mut rng, i as u64);
                proptest::prop_assert!((1..=max).contains(&track));
                if max > 1 {
                    proptest::prop_assert_ne!(track, before);
                }
            }
        }
    }
}
