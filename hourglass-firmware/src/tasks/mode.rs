//! Mode task
//!
//! Owns the mode controller, the frame buffer and every mode. Each tick it
//! drains at most one event, dispatches it (or switches modes on the switch
//! event) and then updates the active mode.

use defmt::*;
use embassy_rp::clocks::RoscRng;
use embassy_time::{Duration, Instant, Ticker};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use smart_leds::RGB8;

use hourglass_core::audio::{AudioMessage, AudioSink};
use hourglass_core::config::DeviceConfig;
use hourglass_core::input::Event;
use hourglass_core::matrix::{Color, FrameBuffer, LED_COUNT};
use hourglass_core::mode::{ModeContext, ModeController, Transition};
use hourglass_core::modes::{BatteryMode, LightingMode, ScreenMode, TimerMode, MODE_COUNT};
use hourglass_core::power::PowerSnapshot;
use hourglass_core::traits::LedStrip;

use crate::channels::{
    note_dropped, LedFrame, AUDIO_CHANNEL, DROPPED_AUDIO, EVENT_CHANNEL, LED_FRAME,
    POWER_SNAPSHOT, SCREEN_COMMANDS, SCREEN_SESSION,
};

/// Long press on B cycles modes
const SWITCH_EVENT: Event = Event::ButtonBLong;

/// Strip front end that hands whole frames to the LED task
struct SignalStrip {
    pixels: [RGB8; LED_COUNT],
    brightness: u8,
}

impl LedStrip for SignalStrip {
    fn stage(&mut self, index: usize, color: Color) {
        if let Some(p) = self.pixels.get_mut(index) {
            *p = color;
        }
    }

    fn show(&mut self) {
        LED_FRAME.signal(LedFrame {
            pixels: self.pixels,
            brightness: self.brightness,
        });
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }
}

/// Producer side of the audio channel
struct ChannelSink;

impl AudioSink for ChannelSink {
    fn try_send(&mut self, message: AudioMessage) -> Result<(), AudioMessage> {
        AUDIO_CHANNEL.try_send(message).map_err(|_| {
            warn!("Audio channel full, dropping {:?}", message);
            note_dropped(&DROPPED_AUDIO);
            message
        })
    }

    fn clear(&mut self) {
        AUDIO_CHANNEL.clear();
    }
}

fn log_transition(t: Transition) {
    match t.from {
        Some(from) => info!("Mode: {} -> {}", from, t.to),
        None => info!("Mode: {}", t.to),
    }
}

/// Mode task - drain one event, then update the active mode
#[embassy_executor::task]
pub async fn mode_task(config: &'static DeviceConfig) {
    info!("Mode task started");

    let mut timer = TimerMode::new(config.timer.clone());
    let mut lighting = LightingMode::new(config.matrix.brightness);
    let mut battery = BatteryMode::new();
    let mut screen = ScreenMode::new();

    let mut controller: ModeController<'_, MODE_COUNT> = ModeController::new(SWITCH_EVENT);
    controller.register(&mut timer);
    controller.register(&mut lighting);
    controller.register(&mut battery);
    let Some(screen_id) = controller.register_gated(&mut screen, false) else {
        error!("Mode registry full");
        return;
    };

    let mut matrix = FrameBuffer::new();
    let mut strip = SignalStrip {
        pixels: [RGB8::default(); LED_COUNT],
        brightness: config.matrix.brightness,
    };
    let mut audio = ChannelSink;
    let mut rng = SmallRng::seed_from_u64(RoscRng.next_u64());
    let mut power: Option<PowerSnapshot> = None;

    macro_rules! context {
        ($remote:expr) => {
            ModeContext {
                matrix: &mut matrix,
                strip: &mut strip,
                audio: &mut audio,
                rng: &mut rng,
                now_ms: Instant::now().as_millis(),
                power,
                remote: $remote,
            }
        };
    }

    if let Some(t) = controller.init(&mut context!(None)) {
        log_transition(t);
    }
    info!("{} modes registered", controller.count());

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config.modes.tick_ms)));

    loop {
        ticker.next().await;

        if let Some(snapshot) = POWER_SNAPSHOT.try_take() {
            power = Some(snapshot);
        }

        // Only the newest command is worth acting on
        let mut remote = None;
        while let Ok(c) = SCREEN_COMMANDS.try_receive() {
            remote = Some(c);
        }

        if let Some(up) = SCREEN_SESSION.try_take() {
            let mut cx = context!(None);
            let transition = if up {
                info!("Screen session started");
                controller.set_available(screen_id, true, &mut cx);
                controller.switch_to_mode(screen_id, &mut cx)
            } else {
                info!("Screen session ended");
                controller.set_available(screen_id, false, &mut cx)
            };
            if let Some(t) = transition {
                log_transition(t);
            }
        }

        let event = EVENT_CHANNEL.try_receive().ok();
        if let Some(e) = event {
            debug!("Dispatching {:?}", e);
        }

        if let Some(t) = controller.step(event, &mut context!(remote)) {
            log_transition(t);
        }
    }
}
