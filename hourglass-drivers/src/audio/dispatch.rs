//! Maps queued [`AudioMessage`]s onto player calls

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use hourglass_core::audio::AudioMessage;
use rand::RngCore;

use super::jq8900::Jq8900;

/// Execute one request
///
/// Transport commands, volume and track selection are blocking; a random
/// pick only arms the stepped sequencer, which the caller advances with
/// [`Jq8900::update`].
pub fn dispatch<P, D, R>(
    player: &mut Jq8900<P, D>,
    message: AudioMessage,
    now_ms: u64,
    rng: &mut R,
) -> Result<(), P::Error>
where
    P: OutputPin,
    D: DelayNs,
    R: RngCore + ?Sized,
{
    match message.clamped() {
        AudioMessage::Play => player.play(),
        AudioMessage::Pause => player.pause(),
        AudioMessage::Stop => player.stop(),
        AudioMessage::Next => player.next(),
        AudioMessage::SetVolume(volume) => player.set_volume(volume),
        AudioMessage::PlayTrack(track) => player.play_track(track),
        AudioMessage::PlayRandom => {
            player.play_random(rng, now_ms);
            Ok(())
        }
    }
}
