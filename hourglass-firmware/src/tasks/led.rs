//! WS2812 output task
//!
//! Waits for committed frames and pushes them to the strip over PIO. Frames
//! that arrive while a transfer is running collapse into the newest one.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use smart_leds::{brightness, RGB8};

use hourglass_core::matrix::LED_COUNT;

use crate::channels::LED_FRAME;

/// Matrix strip on PIO0 state machine 0
pub type MatrixStrip = PioWs2812<'static, PIO0, 0, LED_COUNT>;

/// LED task - writes the latest frame to the strip
#[embassy_executor::task]
pub async fn led_task(mut ws2812: MatrixStrip) {
    info!("LED task started");

    // Start dark regardless of what the strip powered up with
    ws2812.write(&[RGB8::default(); LED_COUNT]).await;

    loop {
        let frame = LED_FRAME.wait().await;

        let mut scaled = [RGB8::default(); LED_COUNT];
        for (out, px) in scaled
            .iter_mut()
            .zip(brightness(frame.pixels.iter().copied(), frame.brightness))
        {
            *out = px;
        }

        ws2812.write(&scaled).await;
        trace!("Strip frame written, brightness {}", frame.brightness);
    }
}
