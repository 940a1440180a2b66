//! Audio task
//!
//! Runs on core 1. Owns the JQ8900 behind [`AUDIO_DEVICE`], advances the
//! stepped sequencer every iteration and serves one queued request at a time.

use defmt::*;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Delay, Duration, Instant};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use hourglass_core::config::AudioConfig;
use hourglass_drivers::audio::{dispatch, Jq8900, Jq8900Config};

use crate::channels::AUDIO_CHANNEL;

/// Audio line player
pub type AudioDevice = Jq8900<Output<'static>, Delay>;

/// The audio device, shared by everything that transmits on the line
pub static AUDIO_DEVICE: Mutex<CriticalSectionRawMutex, Option<AudioDevice>> = Mutex::new(None);

/// Audio task - drains the audio queue into the player
#[embassy_executor::task]
pub async fn audio_task(pin: Output<'static>, config: &'static AudioConfig) {
    info!("Audio task started");

    let mut player = Jq8900::new(
        pin,
        Delay,
        Jq8900Config {
            timing: config.pulse,
            max_tracks: config.max_tracks,
            min_interval_ms: u64::from(config.min_interval_ms),
        },
    );

    // Output pin errors are Infallible
    let Ok(()) = player.begin();
    let Ok(()) = player.set_volume(config.volume);
    let Ok(()) = player.set_loop_mode(config.loop_mode);
    info!(
        "JQ8900 ready: volume={}, loop={:?}, tracks={}",
        config.volume, config.loop_mode, config.max_tracks
    );

    *AUDIO_DEVICE.lock().await = Some(player);

    let mut rng = SmallRng::seed_from_u64(RoscRng.next_u64());
    let mutex_wait = Duration::from_millis(u64::from(config.mutex_wait_ms));
    let receive_timeout = Duration::from_millis(u64::from(config.receive_timeout_ms));

    loop {
        // Advance the stepped sequencer before looking at new requests
        match with_timeout(mutex_wait, AUDIO_DEVICE.lock()).await {
            Ok(mut guard) => {
                if let Some(player) = guard.as_mut() {
                    match player.update(Instant::now().as_millis()) {
                        Ok(Some(byte)) => trace!("Audio step: 0x{:02x}", byte),
                        Ok(None) => {}
                        Err(e) => match e {},
                    }
                }
            }
            Err(_) => debug!("Audio device busy, skipping step"),
        }

        let Ok(message) = with_timeout(receive_timeout, AUDIO_CHANNEL.receive()).await else {
            continue;
        };

        debug!("Audio request: {:?}", message);

        match with_timeout(mutex_wait, AUDIO_DEVICE.lock()).await {
            Ok(mut guard) => {
                if let Some(player) = guard.as_mut() {
                    let Ok(()) = dispatch(player, message, Instant::now().as_millis(), &mut rng);
                    trace!(
                        "Audio state: {:?}, track {}",
                        player.player_state(),
                        player.current_track()
                    );
                }
            }
            Err(_) => warn!("Audio device lock timed out, skipping {:?}", message),
        }
    }
}
