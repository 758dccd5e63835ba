//! Named GPIO layouts of common controller boards

use crate::config::{HardwareMapping, MAX_ADDRESS_LINES};

/// GPIO numbers of a controller board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLayout {
    pub output_enable: u8,
    pub clock: u8,
    pub strobe: u8,
    /// Lines A..E
    pub address: [u8; MAX_ADDRESS_LINES],
    /// Per parallel chain: R1, G1, B1, R2, G2, B2
    pub chains: &'static [[u8; 6]],
}

const REGULAR: PinLayout = PinLayout {
    output_enable: 18,
    clock: 17,
    strobe: 4,
    address: [22, 23, 24, 25, 15],
    chains: &[
        [11, 27, 7, 8, 9, 10],
        [12, 5, 6, 19, 13, 20],
        [14, 2, 3, 26, 16, 21],
    ],
};

const ADAFRUIT_HAT: PinLayout = PinLayout {
    output_enable: 4,
    clock: 17,
    strobe: 21,
    address: [22, 26, 27, 20, 24],
    chains: &[[5, 13, 6, 12, 16, 23]],
};

/// Hardware PWM variant: OE moved to GPIO 18
const ADAFRUIT_HAT_PWM: PinLayout = PinLayout {
    output_enable: 18,
    ..ADAFRUIT_HAT
};

impl HardwareMapping {
    /// Pin layout of the mapping, when one is known
    pub fn pin_layout(self) -> Option<&'static PinLayout> {
        match self {
            Self::Regular => Some(&REGULAR),
            Self::AdafruitHat => Some(&ADAFRUIT_HAT),
            Self::AdafruitHatPwm => Some(&ADAFRUIT_HAT_PWM),
            Self::RegularPi1 | Self::Classic | Self::ClassicPi1 => None,
        }
    }
}
