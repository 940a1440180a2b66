//! Events produced by input sampling

/// Physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
    C,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::A, Button::B, Button::C];
}

/// Input events consumed by the mode controller or the active mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Short press, fired on release
    ButtonA,
    ButtonB,
    ButtonC,
    /// Long press, fired when the hold threshold is crossed
    ButtonALong,
    ButtonBLong,
    ButtonCLong,
    /// Sum of per-axis acceleration deltas exceeded the shake threshold
    Shake,
    /// Device tipped into the left zone
    TiltLeft,
    /// Device tipped into the right zone
    TiltRight,
    /// Device returned to level
    TiltCenter,
}

impl Event {
    /// Short-press event for a button
    pub const fn short(button: Button) -> Self {
        match button {
            Button::A => Event::ButtonA,
            Button::B => Event::ButtonB,
            Button::C => Event::ButtonC,
        }
    }

    /// Long-press event for a button
    pub const fn long(button: Button) -> Self {
        match button {
            Button::A => Event::ButtonALong,
            Button::B => Event::ButtonBLong,
            Button::C => Event::ButtonCLong,
        }
    }

    /// Button that produced this event, if any
    pub fn button(&self) -> Option<Button> {
        match self {
            Event::ButtonA | Event::ButtonALong => Some(Button::A),
            Event::ButtonB | Event::ButtonBLong => Some(Button::B),
            Event::ButtonC | Event::ButtonCLong => Some(Button::C),
            _ => None,
        }
    }

    pub fn is_long_press(&self) -> bool {
        matches!(
            self,
            Event::ButtonALong | Event::ButtonBLong | Event::ButtonCLong
        )
    }

    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Event::Shake | Event::TiltLeft | Event::TiltRight | Event::TiltCenter
        )
    }
}
