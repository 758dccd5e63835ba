//! Physical color wire order
//!
//! Some panels mix up their color inputs. The sequence names, for each
//! physical wire (R pin, G pin, B pin), the logical channel that drives it:
//! with `GBR` the R pin carries green, the G pin blue and the B pin red.

use core::fmt;

use serde::Deserialize;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LedSequence {
    #[default]
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl LedSequence {
    /// Parse a sequence name such as `"BGR"` (case-insensitive)
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        const ALL: [LedSequence; 6] = [
            LedSequence::Rgb,
            LedSequence::Rbg,
            LedSequence::Grb,
            LedSequence::Gbr,
            LedSequence::Brg,
            LedSequence::Bgr,
        ];
        ALL.into_iter()
            .find(|sequence| sequence.as_str().eq_ignore_ascii_case(name))
            .ok_or(ConfigError::OutOfRange {
                field: "led_sequence",
            })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Rbg => "RBG",
            Self::Grb => "GRB",
            Self::Gbr => "GBR",
            Self::Brg => "BRG",
            Self::Bgr => "BGR",
        }
    }

    /// Logical channel index (0 = red, 1 = green, 2 = blue) feeding each wire
    pub const fn sources(self) -> [usize; 3] {
        match self {
            Self::Rgb => [0, 1, 2],
            Self::Rbg => [0, 2, 1],
            Self::Grb => [1, 0, 2],
            Self::Gbr => [1, 2, 0],
            Self::Brg => [2, 0, 1],
            Self::Bgr => [2, 1, 0],
        }
    }

    /// Reorder logical `[r, g, b]` values into wire order
    #[inline]
    pub fn to_wires<T: Copy>(self, logical: [T; 3]) -> [T; 3] {
        let [r, g, b] = self.sources();
        [logical[r], logical[g], logical[b]]
    }
}

impl fmt::Display for LedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
