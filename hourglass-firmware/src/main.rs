//! Hourglass - Countdown Timer Appliance Firmware
//!
//! Main firmware binary for RP2040-based LED matrix timers.
//!
//! Core 0 runs the input, sensor, mode, LED and screen-art receive tasks.
//! Core 1 runs the audio task alone, so the busy-wait waveform on the audio
//! line never delays input sampling or matrix refresh.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{I2C0, PIO0, UART0};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartRx, Config as UartConfig};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hourglass_core::config::{parse_config, DeviceConfig};
use hourglass_drivers::sensor::Mpu6886;

mod channels;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../device.toml");

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells (must live forever)
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static DEVICE_CONFIG: StaticCell<DeviceConfig> = StaticCell::new();
static WS2812_PROGRAM: StaticCell<PioWs2812Program<'static, PIO0>> = StaticCell::new();
static CORE1_STACK: StaticCell<Stack<4096>> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Hourglass firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static DeviceConfig = DEVICE_CONFIG.init(load_config());

    // Audio line idles high; the driver owns it from here on
    let audio_pin = Output::new(p.PIN_15, Level::High);
    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| {
            spawner
                .spawn(tasks::audio_task(audio_pin, &config.audio))
                .unwrap();
        });
    });
    info!("Audio task started on core 1");

    // Buttons A/B/C: GPIO2-4, active low
    let buttons = tasks::Buttons {
        a: Input::new(p.PIN_2, Pull::Up),
        b: Input::new(p.PIN_3, Pull::Up),
        c: Input::new(p.PIN_4, Pull::Up),
    };

    // MPU6886 on I2C0 (SDA=GPIO20, SCL=GPIO21)
    let i2c = I2c::new_async(p.I2C0, p.PIN_21, p.PIN_20, Irqs, i2c::Config::default());
    let imu = Mpu6886::new(i2c);

    info!("Input peripherals initialized");

    // WS2812 matrix on GPIO16 via PIO0
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let program = WS2812_PROGRAM.init(PioWs2812Program::new(&mut common));
    let ws2812 = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_16, program);

    info!("PIO WS2812 initialized");

    // Power telemetry: VSYS/3 on GPIO29, VBUS sense on GPIO24
    let power = tasks::PowerInputs {
        adc: Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default()),
        vsys: Channel::new_pin(p.PIN_29, Pull::None),
        temperature: Channel::new_temp_sensor(p.ADC_TEMP_SENSOR),
        vbus: Input::new(p.PIN_24, Pull::None),
    };

    info!("ADC initialized");

    // Screen-art host link on UART0 (RX=GPIO1), 115200 baud default
    let rx_buf = RX_BUF.init([0u8; 256]);
    let screen_rx = BufferedUartRx::new(p.UART0, Irqs, p.PIN_1, rx_buf, UartConfig::default());

    info!("UART initialized for screen-art link");

    // Spawn tasks
    spawner.spawn(tasks::led_task(ws2812)).unwrap();
    spawner
        .spawn(tasks::input_task(buttons, imu, &config.input))
        .unwrap();
    spawner
        .spawn(tasks::sensor_task(power, &config.sensor))
        .unwrap();
    spawner
        .spawn(tasks::screen_rx_task(
            screen_rx,
            config.modes.screen_session_timeout_ms,
        ))
        .unwrap();
    spawner.spawn(tasks::mode_task(config)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        let (events, audio) = channels::dropped_counts();
        trace!(
            "Main loop heartbeat, dropped events={} audio={}",
            events,
            audio
        );
    }
}

/// Parse the embedded device.toml
///
/// Falls back to defaults if the file does not parse. build.rs validates
/// the same file, so this only happens with a reader mismatch.
fn load_config() -> DeviceConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config.sanitized()
        }
        Err(e) => {
            error!(
                "Failed to parse embedded config at line {}: {:?}",
                e.line, e.kind
            );
            error!("Using default configuration");
            DeviceConfig::default()
        }
    }
}
