//! MPU6886 6-axis IMU (accelerometer only)
//!
//! The input task only needs acceleration for shake and tilt detection, so
//! the gyro is left at its reset configuration.
//!
//! Both a blocking ([`embedded_hal::i2c::I2c`]) and an async
//! ([`embedded_hal_async::i2c::I2c`]) bus are supported; the register
//! handling is shared.

use embedded_hal::delay::DelayNs;
use hourglass_core::traits::{Acceleration, MotionError, MotionSensor};

/// Default 7-bit bus address (AD0 low)
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Expected WHO_AM_I value
pub const DEVICE_ID: u8 = 0x19;

/// Register addresses
pub mod reg {
    pub const SMPLRT_DIV: u8 = 0x19;
    pub const CONFIG: u8 = 0x1A;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const ACCEL_CONFIG2: u8 = 0x1D;
    /// First of six big-endian bytes X, Y, Z
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    G2,
    G4,
    #[default]
    G8,
    G16,
}

impl AccelRange {
    /// ACCEL_FS_SEL field of ACCEL_CONFIG
    pub const fn config_bits(self) -> u8 {
        (match self {
            AccelRange::G2 => 0,
            AccelRange::G4 => 1,
            AccelRange::G8 => 2,
            AccelRange::G16 => 3,
        }) << 3
    }

    /// Raw counts per g
    pub const fn lsb_per_g(self) -> i32 {
        match self {
            AccelRange::G2 => 16384,
            AccelRange::G4 => 8192,
            AccelRange::G8 => 4096,
            AccelRange::G16 => 2048,
        }
    }
}

/// Register writes after reset, in order
fn init_writes(range: AccelRange) -> [(u8, u8); 5] {
    [
        // Auto-select the best clock source
        (reg::PWR_MGMT_1, 0x01),
        (reg::ACCEL_CONFIG, range.config_bits()),
        // DLPF 176 Hz
        (reg::CONFIG, 0x01),
        (reg::SMPLRT_DIV, 0x05),
        (reg::ACCEL_CONFIG2, 0x00),
    ]
}

/// Convert the six ACCEL_*OUT bytes to milli-g
pub fn decode_acceleration(raw: &[u8; 6], range: AccelRange) -> Acceleration {
    let axis = |hi: u8, lo: u8| i32::from(i16::from_be_bytes([hi, lo])) * 1000 / range.lsb_per_g();
    Acceleration::new(
        axis(raw[0], raw[1]),
        axis(raw[2], raw[3]),
        axis(raw[4], raw[5]),
    )
}

const RESET_BIT: u8 = 0x80;
const STARTUP_MS: u32 = 10;

pub struct Mpu6886<I> {
    i2c: I,
    address: u8,
    range: AccelRange,
    ready: bool,
}

impl<I> Mpu6886<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS, AccelRange::default())
    }

    pub fn with_address(i2c: I, address: u8, range: AccelRange) -> Self {
        Self {
            i2c,
            address,
            range,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: embedded_hal::i2c::I2c> Mpu6886<I> {
    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), MotionError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|_| MotionError::Bus)
    }

    fn read_regs(&mut self, register: u8, buf: &mut [u8]) -> Result<(), MotionError> {
        self.i2c
            .write_read(self.address, &[register], buf)
            .map_err(|_| MotionError::Bus)
    }

    /// Check the device id, reset it and configure the accelerometer
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), MotionError> {
        self.ready = false;

        let mut id = [0u8];
        self.read_regs(reg::WHO_AM_I, &mut id)?;
        if id[0] != DEVICE_ID {
            return Err(MotionError::WrongDevice(id[0]));
        }

        self.write_reg(reg::PWR_MGMT_1, 0x00)?;
        delay.delay_ms(STARTUP_MS);
        self.write_reg(reg::PWR_MGMT_1, RESET_BIT)?;
        delay.delay_ms(STARTUP_MS);
        for (register, value) in init_writes(self.range) {
            self.write_reg(register, value)?;
            delay.delay_ms(1);
        }

        self.ready = true;
        Ok(())
    }
}

impl<I: embedded_hal::i2c::I2c> MotionSensor for Mpu6886<I> {
    fn read_acceleration(&mut self) -> Result<Acceleration, MotionError> {
        if !self.ready {
            return Err(MotionError::NotReady);
        }
        let mut raw = [0u8; 6];
        self.read_regs(reg::ACCEL_XOUT_H, &mut raw)?;
        Ok(decode_acceleration(&raw, self.range))
    }
}

impl<I: embedded_hal_async::i2c::I2c> Mpu6886<I> {
    async fn write_reg_async(&mut self, register: u8, value: u8) -> Result<(), MotionError> {
        embedded_hal_async::i2c::I2c::write(&mut self.i2c, self.address, &[register, value])
            .await
            .map_err(|_| MotionError::Bus)
    }

    async fn read_regs_async(&mut self, register: u8, buf: &mut [u8]) -> Result<(), MotionError> {
        embedded_hal_async::i2c::I2c::write_read(&mut self.i2c, self.address, &[register], buf)
            .await
            .map_err(|_| MotionError::Bus)
    }

    /// Async counterpart of [`Mpu6886::init`]
    pub async fn init_async<D: embedded_hal_async::delay::DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), MotionError> {
        self.ready = false;

        let mut id = [0u8];
        self.read_regs_async(reg::WHO_AM_I, &mut id).await?;
        if id[0] != DEVICE_ID {
            return Err(MotionError::WrongDevice(id[0]));
        }

        self.write_reg_async(reg::PWR_MGMT_1, 0x00).await?;
        delay.delay_ms(STARTUP_MS).await;
        self.write_reg_async(reg::PWR_MGMT_1, RESET_BIT).await?;
        delay.delay_ms(STARTUP_MS).await;
        for (register, value) in init_writes(self.range) {
            self.write_reg_async(register, value).await?;
            delay.delay_ms(1).await;
        }

        self.ready = true;
        Ok(())
    }

    pub async fn read_acceleration_async(&mut self) -> Result<Acceleration, MotionError> {
        if !self.ready {
            return Err(MotionError::NotReady);
        }
        let mut raw = [0u8; 6];
        self.read_regs_async(reg::ACCEL_XOUT_H, &mut raw).await?;
        Ok(decode_acceleration(&raw, self.range))
    }
}
