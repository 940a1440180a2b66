//! Power telemetry task
//!
//! Reads battery voltage (VSYS/3 on GPIO29), USB presence (VBUS sense on
//! GPIO24) and the die temperature, and publishes the latest snapshot.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Ticker};

use hourglass_core::config::SensorConfig;
use hourglass_core::power::{mv_from_adc, percent_from_mv, temperature_x10_from_adc, PowerSnapshot};

use crate::channels::POWER_SNAPSHOT;

/// VSYS is measured through a 200k/100k divider
const VSYS_DIVIDER: u32 = 3;

/// Nominal USB bus voltage reported while VBUS is present
const USB_NOMINAL_MV: u16 = 5000;

/// ADC inputs the sensor task samples
pub struct PowerInputs {
    pub adc: Adc<'static, Async>,
    pub vsys: Channel<'static>,
    pub temperature: Channel<'static>,
    pub vbus: Input<'static>,
}

/// Sensor task - periodic power snapshot
#[embassy_executor::task]
pub async fn sensor_task(mut inputs: PowerInputs, config: &'static SensorConfig) {
    info!("Sensor task started");

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config.period_ms)));
    let mut last_percent = None;

    loop {
        ticker.next().await;

        let battery_mv = match inputs.adc.read(&mut inputs.vsys).await {
            Ok(raw) => mv_from_adc(raw, VSYS_DIVIDER),
            Err(e) => {
                warn!("Battery ADC read failed: {:?}", e);
                continue;
            }
        };

        let temperature_x10 = match inputs.adc.read(&mut inputs.temperature).await {
            Ok(raw) => temperature_x10_from_adc(raw),
            Err(e) => {
                debug!("Temperature ADC read failed: {:?}", e);
                0
            }
        };

        let usb = inputs.vbus.is_high();
        let snapshot = PowerSnapshot {
            battery_mv,
            battery_percent: percent_from_mv(
                battery_mv,
                config.battery_empty_mv,
                config.battery_full_mv,
            ),
            charging: usb,
            usb_mv: if usb { USB_NOMINAL_MV } else { 0 },
            temperature_x10,
            ..Default::default()
        };

        if last_percent != Some(snapshot.battery_percent) {
            debug!(
                "Battery {} mV ({}%), charging={}",
                snapshot.battery_mv, snapshot.battery_percent, snapshot.charging
            );
            last_percent = Some(snapshot.battery_percent);
        }

        POWER_SNAPSHOT.signal(snapshot);
    }
}
