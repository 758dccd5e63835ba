//! In-memory panel model
//!
//! Emulates the shift registers, output latches and row decoder of a chain
//! of HUB75 panels and integrates the on-time of every LED. Used for tests
//! and for running the refresh loop without hardware.

use alloc::vec;
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use super::{HardwareIoError, NoDelay, PanelSink};
use crate::color::CHANNELS;
use crate::config::{PanelConfig, RowAddressType};

/// Address line A (clock in AB mode)
const LINE_A: u8 = 0b01;
/// Address line B (data in AB mode)
const LINE_B: u8 = 0b10;

/// Bits per chain on the color lines
const CHAIN_BITS: u32 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub shifts: u64,
    pub latches: u64,
    pub address_writes: u64,
    pub shows: u64,
    pub blanks: u64,
    pub dwell_ns: u64,
}

pub struct SimulatedSink<D = NoDelay> {
    width: usize,
    rows: usize,
    parallel: usize,
    double_rows: usize,
    row_address_type: RowAddressType,
    /// Shift registers, one ring of `width` cells per chain
    registers: Vec<u8>,
    head: usize,
    /// Output latches, `[chain][x]`
    latched: Vec<u8>,
    lines: u8,
    /// Row select shift register, newest bit at bit 0
    ab_register: u64,
    /// On-time per LED, `[(y * width + x) * 3 + wire]`
    exposure: Vec<u64>,
    stats: SinkStats,
    delay: D,
}

impl SimulatedSink<NoDelay> {
    pub fn new(config: &PanelConfig) -> Self {
        Self::with_delay(config, NoDelay)
    }
}

impl<D: DelayNs> SimulatedSink<D> {
    /// Sink that also waits out every dwell on `delay`
    pub fn with_delay(config: &PanelConfig, delay: D) -> Self {
        let width = config.canvas_width();
        let parallel = config.parallel();
        Self {
            width,
            rows: config.rows(),
            parallel,
            double_rows: config.double_rows(),
            row_address_type: config.row_address_type(),
            registers: vec![0; width * parallel],
            head: 0,
            latched: vec![0; width * parallel],
            lines: 0,
            ab_register: u64::MAX,
            exposure: vec![0; width * config.canvas_height() * CHANNELS],
            stats: SinkStats::default(),
            delay,
        }
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// Row address currently decoded by the panels
    pub fn selected_row(&self) -> Option<usize> {
        match self.row_address_type {
            RowAddressType::Direct => Some(usize::from(self.lines & 0x1F)),
            RowAddressType::AB => {
                let mask = u64::MAX >> (u64::BITS as usize - self.double_rows);
                let row = (self.ab_register & mask).trailing_ones() as usize;
                (row < self.double_rows).then_some(row)
            }
        }
    }

    /// Latched color bits of column `x` on `chain`
    pub fn latched(&self, chain: usize, x: usize) -> u8 {
        self.latched[chain * self.width + x]
    }

    /// Accumulated on-time of hardware pixel `(x, y)`, in wire order
    pub fn exposure(&self, x: usize, y: usize) -> [u64; CHANNELS] {
        let base = (y * self.width + x) * CHANNELS;
        [
            self.exposure[base],
            self.exposure[base + 1],
            self.exposure[base + 2],
        ]
    }

    pub fn reset_exposure(&mut self) {
        self.exposure.fill(0);
        self.stats = SinkStats::default();
    }

    fn expose(&mut self, row: usize, nanoseconds: u64) {
        for chain in 0..self.parallel {
            for x in 0..self.width {
                let bits = self.latched[chain * self.width + x];
                let upper = chain * self.rows + row;
                for (half, y) in [upper, upper + self.double_rows].into_iter().enumerate() {
                    let base = (y * self.width + x) * CHANNELS;
                    for wire in 0..CHANNELS {
                        if (bits >> (half * CHANNELS + wire)) & 1 != 0 {
                            self.exposure[base + wire] += nanoseconds;
                        }
                    }
                }
            }
        }
    }
}

impl<D: DelayNs> PanelSink for SimulatedSink<D> {
    fn set_address_lines(&mut self, lines: u8) -> Result<(), HardwareIoError> {
        if self.row_address_type == RowAddressType::AB
            && self.lines & LINE_A == 0
            && lines & LINE_A != 0
        {
            self.ab_register = (self.ab_register << 1) | u64::from(lines & LINE_B != 0);
        }
        self.lines = lines;
        self.stats.address_writes += 1;
        Ok(())
    }

    fn shift(&mut self, chains: &[u8]) -> Result<(), HardwareIoError> {
        for (chain, &bits) in chains.iter().take(self.parallel).enumerate() {
            self.registers[chain * self.width + self.head] = bits & ((1 << CHAIN_BITS) - 1);
        }
        self.head = (self.head + 1) % self.width;
        self.stats.shifts += 1;
        Ok(())
    }

    fn latch(&mut self) -> Result<(), HardwareIoError> {
        // The newest bit sits at x = 0, the oldest at the far end.
        for chain in 0..self.parallel {
            let ring = &self.registers[chain * self.width..(chain + 1) * self.width];
            for x in 0..self.width {
                let index = (self.head + self.width - 1 - x) % self.width;
                self.latched[chain * self.width + x] = ring[index];
            }
        }
        self.stats.latches += 1;
        Ok(())
    }

    fn show(&mut self, nanoseconds: u32) -> Result<(), HardwareIoError> {
        if let Some(row) = self.selected_row().filter(|&row| row < self.double_rows) {
            self.expose(row, u64::from(nanoseconds));
        }
        self.delay.delay_ns(nanoseconds);
        self.stats.shows += 1;
        self.stats.dwell_ns += u64::from(nanoseconds);
        Ok(())
    }

    fn blank(&mut self) -> Result<(), HardwareIoError> {
        self.stats.blanks += 1;
        Ok(())
    }

    fn drives_gpio(&self) -> bool {
        false
    }
}
