//! Channel value to PWM target lookup

use crate::math::{cie1931, scale_to};

/// Per-channel lookup from an 8-bit value to a PWM target
///
/// Targets span `0..=(2^pwm_bits - 1) << dither_bits`. With correction
/// enabled the 8-bit value is treated as CIE 1931 lightness and converted to
/// luminance, otherwise it is scaled linearly.
#[derive(Clone)]
pub struct LuminanceTable {
    levels: [u16; 256],
    corrected: bool,
}

impl LuminanceTable {
    pub fn new(pwm_bits: u8, dither_bits: u8, corrected: bool) -> Self {
        let max = max_target(pwm_bits, dither_bits);
        let mut levels = [0; 256];
        for (value, level) in (0..=u8::MAX).zip(levels.iter_mut()) {
            *level = if corrected {
                luminance(value, max)
            } else {
                narrow(scale_to(value, max))
            };
        }
        Self { levels, corrected }
    }

    #[inline]
    pub fn lookup(&self, value: u8) -> u16 {
        self.levels[usize::from(value)]
    }

    pub fn is_corrected(&self) -> bool {
        self.corrected
    }
}

/// Largest target for the given plane and dither depth
pub fn max_target(pwm_bits: u8, dither_bits: u8) -> u32 {
    ((1u32 << pwm_bits) - 1) << dither_bits
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn luminance(value: u8, max: u32) -> u16 {
    narrow((cie1931(value) * max as f32 + 0.5) as u32)
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(target: u32) -> u16 {
    target.min(u32::from(u16::MAX)) as u16
}
