//! HUB75 sink over `embedded-hal` output pins

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use heapless::Vec;

use super::layout::PinLayout;
use super::{HardwareIoError, PanelSink, Signal};
use crate::config::{MAX_ADDRESS_LINES, MAX_PARALLEL, RuntimeOptions};

/// Color pins of one parallel chain
pub struct ChainPins<P> {
    pub r1: P,
    pub g1: P,
    pub b1: P,
    pub r2: P,
    pub g2: P,
    pub b2: P,
}

impl<P> ChainPins<P> {
    /// Pins in color bit order: R1, G1, B1, R2, G2, B2
    fn as_mut_array(&mut self) -> [&mut P; 6] {
        [
            &mut self.r1,
            &mut self.g1,
            &mut self.b1,
            &mut self.r2,
            &mut self.g2,
            &mut self.b2,
        ]
    }
}

pub struct GpioPins<P> {
    pub chains: Vec<ChainPins<P>, MAX_PARALLEL>,
    /// Address lines A, B, C, D, E (as many as the panel uses)
    pub address: Vec<P, MAX_ADDRESS_LINES>,
    pub clock: P,
    pub latch: P,
    /// Active low
    pub output_enable: P,
}

impl<P> GpioPins<P> {
    /// Open the pins of a named layout
    ///
    /// `open` is called with each GPIO number. Returns `None` when the layout
    /// has fewer chains than `parallel`.
    pub fn from_layout<F>(
        layout: &PinLayout,
        parallel: usize,
        address_lines: usize,
        mut open: F,
    ) -> Option<Self>
    where
        F: FnMut(u8) -> P,
    {
        if parallel > layout.chains.len() || address_lines > MAX_ADDRESS_LINES {
            return None;
        }
        let mut chains = Vec::new();
        for &chain in &layout.chains[..parallel] {
            let [r1, g1, b1, r2, g2, b2] = chain.map(&mut open);
            chains
                .push(ChainPins {
                    r1,
                    g1,
                    b1,
                    r2,
                    g2,
                    b2,
                })
                .ok()?;
        }
        let mut address = Vec::new();
        for &gpio in &layout.address[..address_lines] {
            address.push(open(gpio)).ok()?;
        }
        Some(Self {
            chains,
            address,
            clock: open(layout.clock),
            latch: open(layout.strobe),
            output_enable: open(layout.output_enable),
        })
    }
}

/// Sink bit-banging the HUB75 lines
///
/// Every pin write is repeated `gpio_slowdown + 1` times to give slow panels
/// time to settle.
pub struct GpioSink<P, D> {
    pins: GpioPins<P>,
    delay: D,
    writes: u8,
}

impl<P: OutputPin, D: DelayNs> GpioSink<P, D> {
    pub fn new(pins: GpioPins<P>, delay: D, options: &RuntimeOptions) -> Result<Self, HardwareIoError> {
        let mut sink = Self {
            pins,
            delay,
            writes: options.gpio_slowdown.saturating_add(1),
        };
        log::debug!(
            "GPIO sink: {} chains, {} address lines, slowdown {}",
            sink.pins.chains.len(),
            sink.pins.address.len(),
            options.gpio_slowdown
        );
        if options.do_gpio_init {
            sink.init()?;
        }
        Ok(sink)
    }

    /// Give the pins back
    pub fn release(self) -> (GpioPins<P>, D) {
        (self.pins, self.delay)
    }

    fn init(&mut self) -> Result<(), HardwareIoError> {
        self.blank()?;
        drive(&mut self.pins.clock, false, self.writes, Signal::Clock)?;
        drive(&mut self.pins.latch, false, self.writes, Signal::Latch)?;
        self.set_address_lines(0)?;
        let writes = self.writes;
        for chain in &mut self.pins.chains {
            for pin in chain.as_mut_array() {
                drive(pin, false, writes, Signal::Color)?;
            }
        }
        Ok(())
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool, writes: u8, signal: Signal) -> Result<(), HardwareIoError> {
    for _ in 0..writes {
        pin.set_state(PinState::from(high))
            .map_err(|_| HardwareIoError::new(signal))?;
    }
    Ok(())
}

impl<P: OutputPin, D: DelayNs> PanelSink for GpioSink<P, D> {
    fn set_address_lines(&mut self, lines: u8) -> Result<(), HardwareIoError> {
        let writes = self.writes;
        for (line, pin) in self.pins.address.iter_mut().enumerate() {
            drive(pin, (lines >> line) & 1 != 0, writes, Signal::Address)?;
        }
        Ok(())
    }

    fn shift(&mut self, chains: &[u8]) -> Result<(), HardwareIoError> {
        let writes = self.writes;
        for (pins, &bits) in self.pins.chains.iter_mut().zip(chains) {
            for (bit, pin) in pins.as_mut_array().into_iter().enumerate() {
                drive(pin, (bits >> bit) & 1 != 0, writes, Signal::Color)?;
            }
        }
        drive(&mut self.pins.clock, true, writes, Signal::Clock)?;
        drive(&mut self.pins.clock, false, writes, Signal::Clock)
    }

    fn latch(&mut self) -> Result<(), HardwareIoError> {
        drive(&mut self.pins.latch, true, self.writes, Signal::Latch)?;
        drive(&mut self.pins.latch, false, self.writes, Signal::Latch)
    }

    fn show(&mut self, nanoseconds: u32) -> Result<(), HardwareIoError> {
        drive(&mut self.pins.output_enable, false, self.writes, Signal::OutputEnable)?;
        self.delay.delay_ns(nanoseconds);
        drive(&mut self.pins.output_enable, true, self.writes, Signal::OutputEnable)
    }

    fn blank(&mut self) -> Result<(), HardwareIoError> {
        drive(&mut self.pins.output_enable, true, self.writes, Signal::OutputEnable)
    }
}
