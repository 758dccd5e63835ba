//! Panel sink abstraction layer
//!
//! Provides a trait-based abstraction for the HUB75 signal lines, allowing
//! the scan driver to be hardware-agnostic.

mod gpio;
mod layout;
mod simulated;

use core::fmt;

use embedded_hal::delay::DelayNs;

pub use gpio::{ChainPins, GpioPins, GpioSink};
pub use layout::PinLayout;
pub use simulated::{SimulatedSink, SinkStats};

/// HUB75 signal group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Color,
    Clock,
    Latch,
    OutputEnable,
    Address,
}

impl Signal {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Clock => "clock",
            Self::Latch => "latch",
            Self::OutputEnable => "output enable",
            Self::Address => "address",
        }
    }
}

/// Failure to drive a signal line; fatal for the refresh loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareIoError {
    pub signal: Signal,
}

impl HardwareIoError {
    pub const fn new(signal: Signal) -> Self {
        Self { signal }
    }
}

impl fmt::Display for HardwareIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to drive {} line", self.signal.name())
    }
}

impl core::error::Error for HardwareIoError {}

/// Abstract panel sink trait
///
/// Implement this trait to support different hardware backends.
/// The scan driver is generic over this trait.
pub trait PanelSink {
    /// Drive the row address lines, bit 0 is line A
    fn set_address_lines(&mut self, lines: u8) -> Result<(), HardwareIoError>;

    /// Present one column of color bits and pulse the clock
    ///
    /// `chains[c]` holds the six color bits of parallel chain `c`:
    /// bits 0..3 for the upper sub-panel (R, G, B wires), bits 3..6 for the
    /// lower one.
    fn shift(&mut self, chains: &[u8]) -> Result<(), HardwareIoError>;

    /// Transfer the shifted columns to the output latches
    fn latch(&mut self) -> Result<(), HardwareIoError>;

    /// Enable the outputs for `nanoseconds`, then disable them again
    fn show(&mut self, nanoseconds: u32) -> Result<(), HardwareIoError>;

    /// Disable the outputs
    fn blank(&mut self) -> Result<(), HardwareIoError>;

    /// Whether the sink drives real GPIO lines and needs the exclusive lease
    fn drives_gpio(&self) -> bool {
        true
    }
}

/// Delay that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
