//! Binary-coded modulation
//!
//! Every channel value is split into bit planes: plane `i` holds bit `i` of
//! the emitted value and is displayed for `2^i` LSB periods, so the total
//! on-time of a channel is proportional to its value.

use alloc::vec;
use alloc::vec::Vec;

use crate::color::{CHANNELS, LedSequence};
use crate::config::{MAX_PWM_BITS, PanelConfig};
use crate::framebuffer::Framebuffer;
use crate::mapper::Size;
use crate::processor::OutputProcessor;

/// Bit planes of the hardware canvas
///
/// Each cell holds the wire bits of one pixel (bit 0 = R pin, bit 1 = G pin,
/// bit 2 = B pin), already permuted by the LED sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPlaneBuffer {
    width: usize,
    height: usize,
    planes: u8,
    cells: Vec<u8>,
}

impl BitPlaneBuffer {
    /// Create a blank buffer with room for every plane
    pub fn new(width: usize, height: usize, planes: u8) -> Self {
        Self {
            width,
            height,
            planes,
            cells: vec![0; usize::from(MAX_PWM_BITS) * width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of active planes
    pub fn plane_count(&self) -> u8 {
        self.planes
    }

    fn set_plane_count(&mut self, planes: u8) {
        self.planes = planes;
    }

    #[inline]
    fn offset(&self, plane: u8, x: usize, y: usize) -> usize {
        (usize::from(plane) * self.height + y) * self.width + x
    }

    /// Wire bits of hardware pixel `(x, y)` in `plane`
    #[inline]
    pub fn bits(&self, plane: u8, x: usize, y: usize) -> u8 {
        self.cells[self.offset(plane, x, y)]
    }

    /// Emitted value of each wire, rebuilt from the active planes
    pub fn emitted(&self, x: usize, y: usize) -> [u16; CHANNELS] {
        let mut values = [0u16; CHANNELS];
        for plane in 0..self.planes {
            let bits = self.bits(plane, x, y);
            for (wire, value) in values.iter_mut().enumerate() {
                *value |= u16::from((bits >> wire) & 1) << plane;
            }
        }
        values
    }
}

/// Framebuffer to bit-plane encoder
///
/// Owns the output processing state (luminance lookup, dither frame counter)
/// and the bit-plane buffer it fills.
pub struct BitPlaneEncoder {
    visible: Size,
    sequence: LedSequence,
    processor: OutputProcessor,
    /// Hardware cell of every visible pixel, in framebuffer order
    cells: Vec<usize>,
    frame: u32,
    buffer: BitPlaneBuffer,
}

impl BitPlaneEncoder {
    pub fn new(config: &PanelConfig) -> Self {
        let mappers = config.mappers();
        let visible = mappers.visible_size();
        let width = config.canvas_width();

        let mut cells = Vec::with_capacity(visible.area());
        for y in 0..visible.height {
            for x in 0..visible.width {
                let (hx, hy) = mappers.map_to_hardware(x, y);
                cells.push(hy * width + hx);
            }
        }

        Self {
            visible,
            sequence: config.led_sequence(),
            processor: OutputProcessor::from_config(config),
            cells,
            frame: 0,
            buffer: BitPlaneBuffer::new(width, config.canvas_height(), config.pwm_bits()),
        }
    }

    pub fn pwm_bits(&self) -> u8 {
        self.processor.pwm_bits()
    }

    /// Change the number of planes; takes effect on the next encode
    pub fn set_pwm_bits(&mut self, pwm_bits: u8) {
        log::debug!("bit planes: {} -> {}", self.buffer.plane_count(), pwm_bits);
        self.processor.set_pwm_bits(pwm_bits);
        self.buffer.set_plane_count(pwm_bits);
    }

    pub fn luminance_correct(&self) -> bool {
        self.processor.luminance_correct()
    }

    pub fn set_luminance_correct(&mut self, enabled: bool) {
        log::debug!("luminance correction: {enabled}");
        self.processor.set_luminance_correct(enabled);
    }

    pub fn processor(&self) -> &OutputProcessor {
        &self.processor
    }

    /// Frames encoded so far (wrapping), drives the dithering window
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn buffer(&self) -> &BitPlaneBuffer {
        &self.buffer
    }

    /// Encode `framebuffer` into the bit planes
    ///
    /// # Panics
    /// When the framebuffer is not sized to the visible canvas.
    pub fn encode(&mut self, framebuffer: &Framebuffer) -> &BitPlaneBuffer {
        assert!(
            framebuffer.width() == self.visible.width
                && framebuffer.height() == self.visible.height,
            "framebuffer is {}x{}, encoder expects {}x{}",
            framebuffer.width(),
            framebuffer.height(),
            self.visible.width,
            self.visible.height,
        );

        let frame = self.frame;
        let planes = self.buffer.plane_count();
        let plane_size = self.buffer.width * self.buffer.height;
        let processor = &self.processor;
        let sequence = self.sequence;

        for (pixel, &cell) in framebuffer.pixels().iter().zip(&self.cells) {
            let logical = [pixel.r, pixel.g, pixel.b].map(|value| processor.channel(value, frame));
            let wires = sequence.to_wires(logical);
            for plane in 0..planes {
                let mut bits = 0u8;
                for (wire, value) in wires.iter().enumerate() {
                    bits |= u8::from((value >> plane) & 1 != 0) << wire;
                }
                self.buffer.cells[usize::from(plane) * plane_size + cell] = bits;
            }
        }

        self.frame = self.frame.wrapping_add(1);
        &self.buffer
    }
}
