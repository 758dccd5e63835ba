mod sequence;
mod utils;

use smart_leds::RGB8;

pub use sequence::LedSequence;
pub use utils::rgb_from_u32;

pub type Rgb = RGB8;

/// Number of color wires per sub-panel (R, G, B)
pub const CHANNELS: usize = 3;
