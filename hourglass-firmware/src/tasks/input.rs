//! Input sampling task
//!
//! Polls the three buttons and the accelerometer every input tick and
//! forwards detected events to the mode task.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Instant, Ticker};

use hourglass_core::config::InputConfig;
use hourglass_core::input::{InputSample, InputSampler};
use hourglass_drivers::sensor::Mpu6886;

use crate::channels::{note_dropped, DROPPED_EVENTS, EVENT_CHANNEL};

/// Buttons A, B, C (active low)
pub struct Buttons {
    pub a: Input<'static>,
    pub b: Input<'static>,
    pub c: Input<'static>,
}

impl Buttons {
    fn levels(&self) -> [bool; 3] {
        [self.a.is_low(), self.b.is_low(), self.c.is_low()]
    }
}

/// Input task - turns button levels and motion into events
#[embassy_executor::task]
pub async fn input_task(
    buttons: Buttons,
    mut imu: Mpu6886<I2c<'static, I2C0, Async>>,
    config: &'static InputConfig,
) {
    info!("Input task started");

    match imu.init_async(&mut Delay).await {
        Ok(()) => info!("MPU6886 ready"),
        Err(e) => warn!("MPU6886 init failed, motion disabled: {:?}", e),
    }

    let mut sampler = InputSampler::new(config);
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config.tick_ms)));

    loop {
        ticker.next().await;

        let accel = if imu.is_ready() {
            match imu.read_acceleration_async().await {
                Ok(a) => Some(a),
                Err(e) => {
                    trace!("Accel read failed: {:?}", e);
                    None
                }
            }
        } else {
            None
        };

        let sample = InputSample {
            buttons: buttons.levels(),
            accel,
        };

        for event in sampler.sample(&sample, Instant::now().as_millis()) {
            debug!("Input event: {:?}", event);
            if EVENT_CHANNEL.try_send(event).is_err() {
                warn!("Event channel full, dropping {:?}", event);
                note_dropped(&DROPPED_EVENTS);
            }
        }
    }
}
