//! Power telemetry snapshot
//!
//! Published by the sensor task into a single-slot overwrite channel; readers
//! only ever see the latest sample.

/// One telemetry reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerSnapshot {
    /// Battery voltage in millivolts
    pub battery_mv: u16,
    /// Estimated charge, 0-100
    pub battery_percent: u8,
    /// External supply present and charging
    pub charging: bool,
    /// Charge current in mA (0 when discharging or unknown)
    pub charge_ma: u16,
    /// Discharge current in mA (0 when charging or unknown)
    pub discharge_ma: u16,
    /// USB bus voltage in millivolts
    pub usb_mv: u16,
    /// USB current in mA, if measured
    pub usb_ma: u16,
    /// Die temperature in 0.1 °C
    pub temperature_x10: i16,
}

/// Linear charge estimate between `empty_mv` and `full_mv`
///
/// Clamped to 0..=100.
pub fn percent_from_mv(mv: u16, empty_mv: u16, full_mv: u16) -> u8 {
    if full_mv <= empty_mv || mv <= empty_mv {
        return 0;
    }
    if mv >= full_mv {
        return 100;
    }
    let span = u32::from(full_mv - empty_mv);
    let above = u32::from(mv - empty_mv);
    (above * 100 / span) as u8
}

/// Full-scale count of the 12-bit ADC
pub const ADC_MAX: u32 = 4096;

/// ADC reference voltage
pub const ADC_VREF_MV: u32 = 3300;

/// Convert a raw ADC count to millivolts at the pin, scaled by a divider
///
/// `divider` is the ratio of the measured voltage to the pin voltage (3 for
/// the VSYS/3 sense input).
pub fn mv_from_adc(raw: u16, divider: u32) -> u16 {
    let mv = u32::from(raw) * ADC_VREF_MV * divider / ADC_MAX;
    mv.min(u32::from(u16::MAX)) as u16
}

/// Die temperature in 0.1 °C from the internal sensor's raw count
///
/// 27 °C reads 706 mV and the slope is -1.721 mV/°C.
pub fn temperature_x10_from_adc(raw: u16) -> i16 {
    let mv = (u32::from(raw) * ADC_VREF_MV / ADC_MAX) as i32;
    (270 - (mv - 706) * 10_000 / 1721) as i16
}
