//! Accelerometer trait

/// Errors that can occur reading the motion sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Bus transaction failed
    Bus,
    /// Device did not identify as the expected part
    WrongDevice(u8),
    /// Sensor not yet initialized
    NotReady,
}

/// One acceleration sample in milli-g
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acceleration {
    pub x_mg: i32,
    pub y_mg: i32,
    pub z_mg: i32,
}

impl Acceleration {
    pub const fn new(x_mg: i32, y_mg: i32, z_mg: i32) -> Self {
        Self { x_mg, y_mg, z_mg }
    }

    /// Sum of absolute per-axis differences to `other`
    pub fn delta_sum(&self, other: &Acceleration) -> u32 {
        (self.x_mg - other.x_mg).unsigned_abs()
            + (self.y_mg - other.y_mg).unsigned_abs()
            + (self.z_mg - other.z_mg).unsigned_abs()
    }
}

/// Trait for accelerometers used for shake and tilt detection
pub trait MotionSensor {
    /// Read one acceleration sample
    ///
    /// Takes `&mut self` because the read is a bus transaction.
    fn read_acceleration(&mut self) -> Result<Acceleration, MotionError>;
}
