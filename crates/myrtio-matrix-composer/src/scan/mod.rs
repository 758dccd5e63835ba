//! Panel scan driver - row / bit-plane state machine
//!
//! One scan cycle walks every row address of the current field. For each
//! row it selects the address, then for every bit plane and multiplex pass
//! shifts the columns, latches them and keeps the outputs enabled for the
//! plane's dwell time:
//!
//! ```text
//! Idle -> RowSelect -> BitPlaneEmit -> Dwell -+-> BitPlaneEmit (next pass / plane)
//!             ^                                +-> RowSelect    (next row)
//!             +--------------------------------+-> Complete
//! ```

mod multiplex;
mod row_address;
mod timing;

use alloc::boxed::Box;

pub use multiplex::{
    CheckerMultiplex, DirectMultiplex, MultiplexStrategy, StripeMultiplex, multiplex_strategy,
};
pub use row_address::RowAddressing;
pub use timing::DwellTiming;

use crate::bitplane::BitPlaneBuffer;
use crate::color::CHANNELS;
use crate::config::{MAX_PARALLEL, PanelConfig, ScanMode};
use crate::sink::{HardwareIoError, PanelSink};

/// Scan state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// No cycle in progress
    Idle,
    /// Driving the row address lines
    RowSelect,
    /// Shifting and latching one plane of the current row
    BitPlaneEmit,
    /// Outputs enabled for the plane's dwell time
    Dwell,
    /// Every row of the field has been emitted
    Complete,
}

/// Position of the scan within the current cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub row: usize,
    pub plane: u8,
    pub pass: u8,
    pub elapsed_ns: u64,
}

/// Summary of a completed scan cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Bit `r` set when row address `r` was emitted
    pub rows: u32,
    pub latches: u32,
    pub dwell_ns: u64,
    /// Interlace field (0 = even rows, 1 = odd rows); always 0 when progressive
    pub field: u8,
}

/// Scan driver - walks rows, planes and passes over a sink
///
/// Generic over `S: PanelSink` to support different hardware backends.
pub struct ScanDriver<S: PanelSink> {
    sink: S,
    width: usize,
    cols: usize,
    rows: usize,
    parallel: usize,
    double_rows: usize,
    scan_mode: ScanMode,
    addressing: RowAddressing,
    multiplex: Box<dyn MultiplexStrategy + Send>,
    field: u8,
    phase: ScanPhase,
    state: ScanState,
    report: CycleReport,
}

impl<S: PanelSink> ScanDriver<S> {
    pub fn new(config: &PanelConfig, sink: S) -> Self {
        Self {
            sink,
            width: config.canvas_width(),
            cols: config.cols(),
            rows: config.rows(),
            parallel: config.parallel(),
            double_rows: config.double_rows(),
            scan_mode: config.scan_mode(),
            addressing: RowAddressing::new(config.row_address_type(), config.double_rows()),
            multiplex: multiplex_strategy(config.multiplexing()),
            field: 0,
            phase: ScanPhase::Idle,
            state: ScanState::default(),
            report: CycleReport::default(),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Field the next cycle emits
    pub fn field(&self) -> u8 {
        self.field
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Disable the outputs
    pub fn blank(&mut self) -> Result<(), HardwareIoError> {
        self.sink.blank()
    }

    fn first_row(&self) -> usize {
        match self.scan_mode {
            ScanMode::Progressive => 0,
            ScanMode::Interlaced => usize::from(self.field),
        }
    }

    fn row_step(&self) -> usize {
        match self.scan_mode {
            ScanMode::Progressive => 1,
            ScanMode::Interlaced => 2,
        }
    }

    /// Emit one complete cycle of `planes`
    ///
    /// A cycle interrupted by a hardware error is abandoned; the next call
    /// starts a fresh one.
    pub fn run_cycle(
        &mut self,
        planes: &BitPlaneBuffer,
        timing: &DwellTiming,
    ) -> Result<CycleReport, HardwareIoError> {
        self.phase = ScanPhase::Idle;
        loop {
            match self.step(planes, timing) {
                Ok(ScanPhase::Complete) => return Ok(self.report),
                Ok(_) => {}
                Err(error) => {
                    self.phase = ScanPhase::Idle;
                    self.addressing.invalidate();
                    return Err(error);
                }
            }
        }
    }

    /// Perform the work of the current phase and advance the state machine
    ///
    /// # Returns
    /// * the phase entered
    pub fn step(
        &mut self,
        planes: &BitPlaneBuffer,
        timing: &DwellTiming,
    ) -> Result<ScanPhase, HardwareIoError> {
        self.phase = match self.phase {
            ScanPhase::Idle | ScanPhase::Complete => {
                self.state = ScanState {
                    row: self.first_row(),
                    ..ScanState::default()
                };
                self.report = CycleReport {
                    field: self.field,
                    ..CycleReport::default()
                };
                ScanPhase::RowSelect
            }
            ScanPhase::RowSelect => {
                self.addressing.select(&mut self.sink, self.state.row)?;
                self.report.rows |= 1 << self.state.row;
                ScanPhase::BitPlaneEmit
            }
            ScanPhase::BitPlaneEmit => {
                self.shift_row(planes)?;
                self.sink.latch()?;
                self.report.latches += 1;
                ScanPhase::Dwell
            }
            ScanPhase::Dwell => {
                let nanoseconds = timing.plane_nanoseconds(self.state.plane);
                self.sink.show(nanoseconds)?;
                self.state.elapsed_ns += u64::from(nanoseconds);
                self.report.dwell_ns += u64::from(nanoseconds);
                self.advance(planes.plane_count())
            }
        };
        Ok(self.phase)
    }

    /// Move to the next pass, plane or row after a dwell
    fn advance(&mut self, plane_count: u8) -> ScanPhase {
        if self.state.pass + 1 < self.multiplex.passes() {
            self.state.pass += 1;
            return ScanPhase::BitPlaneEmit;
        }
        self.state.pass = 0;

        if self.state.plane + 1 < plane_count {
            self.state.plane += 1;
            return ScanPhase::BitPlaneEmit;
        }
        self.state.plane = 0;

        self.state.row += self.row_step();
        if self.state.row < self.double_rows {
            return ScanPhase::RowSelect;
        }

        if self.scan_mode == ScanMode::Interlaced {
            self.field ^= 1;
        }
        ScanPhase::Complete
    }

    /// Shift every column of the current row, far end first
    fn shift_row(&mut self, planes: &BitPlaneBuffer) -> Result<(), HardwareIoError> {
        let ScanState {
            row, plane, pass, ..
        } = self.state;
        let lower_row = row + self.double_rows;
        let mut column = [0u8; MAX_PARALLEL];

        for x in (0..self.width).rev() {
            let panel_x = x % self.cols;
            let upper_lit = self.multiplex.is_lit(pass, panel_x, row);
            let lower_lit = self.multiplex.is_lit(pass, panel_x, lower_row);
            for (chain, bits) in column.iter_mut().enumerate().take(self.parallel) {
                let top = chain * self.rows;
                let upper = if upper_lit {
                    planes.bits(plane, x, top + row)
                } else {
                    0
                };
                let lower = if lower_lit {
                    planes.bits(plane, x, top + lower_row)
                } else {
                    0
                };
                *bits = upper | (lower << CHANNELS);
            }
            self.sink.shift(&column[..self.parallel])?;
        }
        Ok(())
    }
}
