//! Shared fixtures for the composer tests

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use myrtio_matrix_composer::{
    BitPlaneEncoder, DwellTiming, Framebuffer, MatrixOptions, PanelConfig, ScanDriver,
    SimulatedSink,
};

/// Validate options that are known to be valid
pub fn panel(options: &MatrixOptions<'_>) -> PanelConfig {
    PanelConfig::new(options).expect("panel options should be valid")
}

/// Options with a linear response and no dithering, so that an 8-bit value
/// maps onto `pwm_bits` planes by plain scaling
pub fn linear_options(rows: u8, cols: u8, chain_length: u8, pwm_bits: u8) -> MatrixOptions<'static> {
    MatrixOptions {
        rows,
        cols,
        chain_length,
        pwm_bits,
        pwm_lsb_nanoseconds: 100,
        luminance_correct: false,
        ..MatrixOptions::default()
    }
}

/// Encode `frame` and run `cycles` scan cycles over a simulated panel
pub fn scan(config: &PanelConfig, frame: &Framebuffer, cycles: usize) -> ScanDriver<SimulatedSink> {
    let mut encoder = BitPlaneEncoder::new(config);
    let mut driver = ScanDriver::new(config, SimulatedSink::new(config));
    let timing = DwellTiming::from_config(config);
    for _ in 0..cycles {
        let planes = encoder.encode(frame);
        driver
            .run_cycle(planes, &timing)
            .expect("simulated sink never fails");
    }
    driver
}

/// Black framebuffer sized to the visible canvas of `config`
pub fn blank_frame(config: &PanelConfig) -> Framebuffer {
    let size = config.visible_size();
    Framebuffer::new(size.width, size.height)
}

/// Pin writes recorded by [`MockPin`]: `(pin id, high)`
pub type PinLog = Rc<RefCell<Vec<(u8, bool)>>>;

/// Output pin recording every write into a shared log
pub struct MockPin {
    pub id: u8,
    log: PinLog,
    fail: bool,
}

impl MockPin {
    pub fn new(id: u8, log: &PinLog) -> Self {
        Self {
            id,
            log: Rc::clone(log),
            fail: false,
        }
    }

    /// Pin whose every write fails
    pub fn failing(id: u8, log: &PinLog) -> Self {
        Self {
            fail: true,
            ..Self::new(id, log)
        }
    }
}

impl ErrorType for MockPin {
    type Error = ErrorKind;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

impl MockPin {
    fn write(&mut self, high: bool) -> Result<(), ErrorKind> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        self.log.borrow_mut().push((self.id, high));
        Ok(())
    }
}
