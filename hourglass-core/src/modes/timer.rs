//! Countdown timer mode
//!
//! Short-A from idle plays the start cue, waits briefly, runs a blue 3-2-1
//! lead-in and then counts down from the configured duration. Audio cues mark
//! the start, two warnings, and the end.

use rand::Rng;

use crate::config::TimerConfig;
use crate::input::Event;
use crate::matrix::{Color, BLUE, CYAN, GREEN, PURPLE, RED, YELLOW};
use crate::mode::{Mode, ModeContext};

/// Played when short-A starts the lead-in
pub const CUE_START: u16 = 1;
/// Played when the lead-in ends and the countdown begins
pub const CUE_GO: u16 = 2;
/// Played at each warning second
pub const CUE_WARNING: u16 = 3;
/// Played when the countdown reaches zero
pub const CUE_DONE: u16 = 4;

/// Remaining seconds that trigger [`CUE_WARNING`]
pub const WARNING_SECONDS: [u8; 2] = [35, 25];

/// Colors the digits can take after a shake
pub const DIGIT_COLORS: [Color; 6] = [BLUE, YELLOW, RED, GREEN, PURPLE, CYAN];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerPhase {
    /// Stopwatch icon, waiting for short-A
    Idle,
    /// Start cue playing
    Cue { since_ms: u64 },
    /// Blue lead-in digits
    LeadIn { since_ms: u64 },
    /// Counting down
    Running { since_ms: u64 },
    /// Countdown frozen with `elapsed_ms` already used
    Paused { elapsed_ms: u64 },
    /// Reached zero
    Finished,
}

pub struct TimerMode {
    config: TimerConfig,
    phase: TimerPhase,
    last_remaining: u8,
    tens_color: Color,
    ones_color: Color,
}

impl TimerMode {
    pub fn new(config: TimerConfig) -> Self {
        let duration = config.duration_s;
        Self {
            config,
            phase: TimerPhase::Idle,
            last_remaining: duration,
            tens_color: DIGIT_COLORS[0],
            ones_color: DIGIT_COLORS[1],
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn colors(&self) -> (Color, Color) {
        (self.tens_color, self.ones_color)
    }

    /// Seconds left on the countdown at `now_ms`
    pub fn remaining(&self, now_ms: u64) -> u8 {
        let elapsed_ms = match self.phase {
            TimerPhase::Running { since_ms } => now_ms.saturating_sub(since_ms),
            TimerPhase::Paused { elapsed_ms } => elapsed_ms,
            TimerPhase::Finished => return 0,
            _ => return self.config.duration_s,
        };
        let elapsed_s = (elapsed_ms / 1000).min(u64::from(self.config.duration_s));
        self.config.duration_s - elapsed_s as u8
    }

    fn reset(&mut self, cx: &mut ModeContext<'_>) {
        self.phase = TimerPhase::Idle;
        self.last_remaining = self.config.duration_s;
        cx.matrix.show_stopwatch(BLUE);
        cx.flush();
    }

    fn draw_remaining(&self, remaining: u8, cx: &mut ModeContext<'_>) {
        if remaining >= 10 {
            cx.matrix
                .show_two_numbers(remaining / 10, remaining % 10, self.tens_color, self.ones_color);
        } else {
            cx.matrix.show_number(remaining, self.ones_color);
        }
        cx.flush();
    }

    fn randomize_colors(&mut self, cx: &mut ModeContext<'_>) {
        let first = cx.rng.gen_range(0..DIGIT_COLORS.len());
        let mut second = cx.rng.gen_range(0..DIGIT_COLORS.len());
        while second == first {
            second = cx.rng.gen_range(0..DIGIT_COLORS.len());
        }
        self.tens_color = DIGIT_COLORS[first];
        self.ones_color = DIGIT_COLORS[second];
    }

    fn tick_countdown(&mut self, cx: &mut ModeContext<'_>) {
        let remaining = self.remaining(cx.now_ms);

        if remaining != self.last_remaining {
            if WARNING_SECONDS.contains(&remaining) {
                cx.audio.stop_then_play(CUE_WARNING);
            } else if remaining == 0 {
                cx.audio.stop_then_play(CUE_DONE);
            }
            self.last_remaining = remaining;
        }

        if remaining == 0 {
            self.phase = TimerPhase::Finished;
        }
        self.draw_remaining(remaining, cx);
    }
}

impl Mode for TimerMode {
    fn name(&self) -> &'static str {
        "Timer"
    }

    fn begin(&mut self, cx: &mut ModeContext<'_>) {
        match self.phase {
            TimerPhase::Idle => {
                cx.matrix.show_stopwatch(BLUE);
                cx.flush();
            }
            TimerPhase::Cue { .. } => {
                cx.matrix.show_number(self.config.lead_in_s, BLUE);
                cx.flush();
            }
            TimerPhase::LeadIn { since_ms } => {
                let lead_in = u64::from(self.config.lead_in_s);
                let elapsed_s = cx.now_ms.saturating_sub(since_ms) / 1000;
                cx.matrix
                    .show_number(lead_in.saturating_sub(elapsed_s).max(1) as u8, BLUE);
                cx.flush();
            }
            TimerPhase::Running { .. } | TimerPhase::Paused { .. } | TimerPhase::Finished => {
                let remaining = self.remaining(cx.now_ms);
                self.draw_remaining(remaining, cx);
            }
        }
    }

    fn update(&mut self, cx: &mut ModeContext<'_>) {
        let now = cx.now_ms;
        match self.phase {
            TimerPhase::Cue { since_ms } => {
                if now.saturating_sub(since_ms) >= u64::from(self.config.cue_delay_ms) {
                    self.phase = TimerPhase::LeadIn { since_ms: now };
                    cx.matrix.show_number(self.config.lead_in_s, BLUE);
                    cx.flush();
                }
            }
            TimerPhase::LeadIn { since_ms } => {
                let elapsed_s = now.saturating_sub(since_ms) / 1000;
                let lead_in = u64::from(self.config.lead_in_s);
                if elapsed_s >= lead_in {
                    self.phase = TimerPhase::Running { since_ms: now };
                    self.last_remaining = self.config.duration_s;
                    cx.audio.stop_then_play(CUE_GO);
                    self.draw_remaining(self.config.duration_s, cx);
                } else {
                    cx.matrix.show_number((lead_in - elapsed_s) as u8, BLUE);
                    cx.flush();
                }
            }
            TimerPhase::Running { .. } => self.tick_countdown(cx),
            TimerPhase::Idle | TimerPhase::Paused { .. } | TimerPhase::Finished => {}
        }
    }

    fn exit(&mut self, cx: &mut ModeContext<'_>) {
        cx.matrix.clear();
        cx.flush();
    }

    fn handle_event(&mut self, event: Event, cx: &mut ModeContext<'_>) {
        let now = cx.now_ms;
        match event {
            Event::ButtonA => match self.phase {
                TimerPhase::Idle | TimerPhase::Finished => {
                    self.last_remaining = self.config.duration_s;
                    self.phase = TimerPhase::Cue { since_ms: now };
                    cx.audio.stop_then_play(CUE_START);
                }
                TimerPhase::Running { since_ms } => {
                    self.phase = TimerPhase::Paused {
                        elapsed_ms: now.saturating_sub(since_ms),
                    };
                }
                TimerPhase::Paused { elapsed_ms } => {
                    self.phase = TimerPhase::Running {
                        since_ms: now.saturating_sub(elapsed_ms),
                    };
                }
                TimerPhase::Cue { .. } | TimerPhase::LeadIn { .. } => {}
            },
            Event::ButtonALong => self.reset(cx),
            Event::Shake => {
                if matches!(
                    self.phase,
                    TimerPhase::Running { .. } | TimerPhase::Paused { .. }
                ) {
                    self.randomize_colors(cx);
                    let remaining = self.remaining(now);
                    self.draw_remaining(remaining, cx);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioMessage;
    use crate::matrix::BLACK;
    use crate::mode::tests::Rig;

    fn started(rig: &mut Rig) -> TimerMode {
        let mut t = TimerMode::new(TimerConfig::default());
        t.begin(&mut rig.cx());
        t.handle_event(Event::ButtonA, &mut rig.cx());
        t
    }

    /// Advance in mode ticks up to `until_ms`
    fn run_until(t: &mut TimerMode, rig: &mut Rig, until_ms: u64) {
        while rig.now_ms < until_ms {
            rig.now_ms += 50;
            t.update(&mut rig.cx());
        }
    }

    #[test]
    fn test_idle_shows_stopwatch() {
        let mut rig = Rig::new();
        let mut t = TimerMode::new(TimerConfig::default());
        t.begin(&mut rig.cx());
        assert_eq!(rig.matrix.pixel(0, 0), Some(BLUE));
        assert_eq!(rig.matrix.pixel(1, 1), Some(BLACK));
        assert_eq!(rig.matrix.dirty_count(), 0);
    }

    #[test]
    fn test_start_plays_cue_one() {
        let mut rig = Rig::new();
        let t = started(&mut rig);
        assert_eq!(t.phase(), TimerPhase::Cue { since_ms: 0 });
        assert_eq!(
            rig.audio.drain().as_slice(),
            &[AudioMessage::Stop, AudioMessage::PlayTrack(CUE_START)]
        );
    }

    #[test]
    fn test_lead_in_then_countdown() {
        let mut rig = Rig::new();
        let mut t = started(&mut rig);
        rig.audio.drain();

        run_until(&mut t, &mut rig, 500);
        assert_eq!(t.phase(), TimerPhase::LeadIn { since_ms: 500 });

        run_until(&mut t, &mut rig, 3450);
        assert!(matches!(t.phase(), TimerPhase::LeadIn { .. }));
        assert!(rig.audio.drain().is_empty());

        run_until(&mut t, &mut rig, 3500);
        assert_eq!(t.phase(), TimerPhase::Running { since_ms: 3500 });
        assert_eq!(
            rig.audio.drain().as_slice(),
            &[AudioMessage::Stop, AudioMessage::PlayTrack(CUE_GO)]
        );
        // "60": tens in blue, ones in yellow
        assert_eq!(rig.matrix.pixel(0, 0), Some(BLUE));
        assert_eq!(rig.matrix.pixel(4, 0), Some(YELLOW));
    }

    #[test]
    fn test_warning_and_done_cues() {
        let mut rig = Rig::new();
        let mut t = started(&mut rig);
        run_until(&mut t, &mut rig, 3500);
        rig.audio.drain();

        // 25 s elapsed -> 35 remaining
        run_until(&mut t, &mut rig, 3500 + 25_000);
        assert_eq!(t.remaining(rig.now_ms), 35);
        assert_eq!(
            rig.audio.drain().as_slice(),
            &[AudioMessage::Stop, AudioMessage::PlayTrack(CUE_WARNING)]
        );

        run_until(&mut t, &mut rig, 3500 + 35_000);
        assert_eq!(
            rig.audio.drain().as_slice(),
            &[AudioMessage::Stop, AudioMessage::PlayTrack(CUE_WARNING)]
        );

        run_until(&mut t, &mut rig, 3500 + 60_000);
        assert_eq!(t.phase(), TimerPhase::Finished);
        assert_eq!(
            rig.audio.drain().as_slice(),
            &[AudioMessage::Stop, AudioMessage::PlayTrack(CUE_DONE)]
        );

        // Stays finished, no repeated cue
        run_until(&mut t, &mut rig, 3500 + 70_000);
        assert!(rig.audio.drain().is_empty());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut rig = Rig::new();
        let mut t = started(&mut rig);
        run_until(&mut t, &mut rig, 3500 + 10_000);
        assert_eq!(t.remaining(rig.now_ms), 50);

        t.handle_event(Event::ButtonA, &mut rig.cx());
        run_until(&mut t, &mut rig, 3500 + 40_000);
        assert_eq!(t.remaining(rig.now_ms), 50);

        t.handle_event(Event::ButtonA, &mut rig.cx());
        run_until(&mut t, &mut rig, 3500 + 45_000);
        assert_eq!(t.remaining(rig.now_ms), 45);
    }

    #[test]
    fn test_long_a_resets() {
        let mut rig = Rig::new();
        let mut t = started(&mut rig);
        run_until(&mut t, &mut rig, 8000);

        t.handle_event(Event::ButtonALong, &mut rig.cx());
        assert_eq!(t.phase(), TimerPhase::Idle);
        assert_eq!(t.remaining(rig.now_ms), 60);
        assert_eq!(rig.matrix.pixel(2, 2), Some(BLUE));
    }

    #[test]
    fn test_shake_only_while_counting() {
        let mut rig = Rig::new();
        let mut t = TimerMode::new(TimerConfig::default());
        t.begin(&mut rig.cx());
        t.handle_event(Event::Shake, &mut rig.cx());
        assert_eq!(t.colors(), (BLUE, YELLOW));

        t.handle_event(Event::ButtonA, &mut rig.cx());
        run_until(&mut t, &mut rig, 4000);
        for _ in 0..20 {
            t.handle_event(Event::Shake, &mut rig.cx());
            let (tens, ones) = t.colors();
            assert_ne!(tens, ones);
            assert!(DIGIT_COLORS.contains(&tens));
            assert!(DIGIT_COLORS.contains(&ones));
        }
    }

    #[test]
    fn test_short_a_ignored_during_lead_in() {
        let mut rig = Rig::new();
        let mut t = started(&mut rig);
        run_until(&mut t, &mut rig, 1000);
        t.handle_event(Event::ButtonA, &mut rig.cx());
        assert!(matches!(t.phase(), TimerPhase::LeadIn { .. }));
    }

    #[test]
    fn test_reenter_during_cue_draws_lead_in() {
        let mut rig = Rig::new();
        let mut t = started(&mut rig);
        t.exit(&mut rig.cx());
        assert_eq!(rig.matrix.dirty_count(), 0);

        rig.now_ms = 100;
        t.begin(&mut rig.cx());
        assert_eq!(t.phase(), TimerPhase::Cue { since_ms: 0 });

        let mut expected = crate::matrix::FrameBuffer::new();
        expected.show_number(3, BLUE);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(rig.matrix.pixel(x, y), expected.pixel(x, y));
            }
        }
        assert!((0..64).any(|i| rig.matrix.pixel(i % 8, i / 8) == Some(BLUE)));
        assert_eq!(rig.matrix.dirty_count(), 0);
    }
}
