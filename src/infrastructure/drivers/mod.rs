mod std_delay;

pub use std_delay::StdDelay;
