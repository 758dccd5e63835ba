//! Ordered temporal dithering
//!
//! A target carrying `d` extra precision bits is spread over a window of
//! `2^d` frames. Frame `k` emits `target >> d`, plus one when the
//! bit-reversed `k` falls below the remainder, so the sum over any aligned
//! window equals the target exactly.

use crate::math::bit_reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dither {
    bits: u8,
}

impl Dither {
    pub const fn new(bits: u8) -> Self {
        Self { bits }
    }

    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Frames in one dithering window
    pub const fn window(self) -> u32 {
        1 << self.bits
    }

    /// Value emitted for `target` on frame `frame`
    #[inline]
    pub fn emit(self, target: u16, frame: u32) -> u16 {
        if self.bits == 0 {
            return target;
        }
        let mask = (1u32 << self.bits) - 1;
        let threshold = bit_reverse(frame & mask, self.bits);
        (target >> self.bits) + u16::from(threshold < (u32::from(target) & mask))
    }
}
