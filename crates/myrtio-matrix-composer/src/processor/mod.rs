//! Output processing pipeline
//!
//! Turns an 8-bit channel value into the value emitted on the bit planes.
//! Processing order:
//! 1. Inversion (for panels with inverted color inputs)
//! 2. Luminance lookup (CIE 1931 or linear)
//! 3. Temporal dithering

mod dither;
mod luminance;

pub use dither::Dither;
pub use luminance::{LuminanceTable, max_target};

use crate::config::PanelConfig;

#[derive(Clone)]
pub struct OutputProcessor {
    inverse: bool,
    pwm_bits: u8,
    table: LuminanceTable,
    dither: Dither,
}

impl OutputProcessor {
    pub fn new(pwm_bits: u8, dither_bits: u8, luminance_correct: bool, inverse: bool) -> Self {
        Self {
            inverse,
            pwm_bits,
            table: LuminanceTable::new(pwm_bits, dither_bits, luminance_correct),
            dither: Dither::new(dither_bits),
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(
            config.pwm_bits(),
            config.pwm_dither_bits(),
            config.luminance_correct(),
            config.inverse_colors(),
        )
    }

    pub fn pwm_bits(&self) -> u8 {
        self.pwm_bits
    }

    pub fn luminance_correct(&self) -> bool {
        self.table.is_corrected()
    }

    pub fn dither(&self) -> Dither {
        self.dither
    }

    /// Rebuild the lookup for a new plane count
    pub fn set_pwm_bits(&mut self, pwm_bits: u8) {
        if pwm_bits != self.pwm_bits {
            self.pwm_bits = pwm_bits;
            self.rebuild(self.luminance_correct());
        }
    }

    pub fn set_luminance_correct(&mut self, enabled: bool) {
        if enabled != self.luminance_correct() {
            self.rebuild(enabled);
        }
    }

    fn rebuild(&mut self, corrected: bool) {
        self.table = LuminanceTable::new(self.pwm_bits, self.dither.bits(), corrected);
    }

    /// Dither target of a channel value, before temporal spreading
    #[inline]
    pub fn target(&self, value: u8) -> u16 {
        let value = if self.inverse { u8::MAX - value } else { value };
        self.table.lookup(value)
    }

    /// Value emitted on the bit planes for a channel on `frame`
    #[inline]
    pub fn channel(&self, value: u8, frame: u32) -> u16 {
        self.dither.emit(self.target(value), frame)
    }
}
