mod frame_exchange;
mod lease;

pub use frame_exchange::{Canvas, FrameReader, frame_exchange};
pub use lease::GpioLease;
