//! Row address line protocols

use crate::config::RowAddressType;
use crate::sink::{HardwareIoError, PanelSink};

const LINE_A: u8 = 0b01;
const LINE_B: u8 = 0b10;

/// Row selection state, remembers the last selected row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAddressing {
    /// Row number on lines A..E
    Direct { last: Option<usize> },
    /// Shift-register row select: A clocks in B. One low bit among
    /// `double_rows` clocked bits selects the row.
    AB {
        double_rows: usize,
        last: Option<usize>,
    },
}

impl RowAddressing {
    pub fn new(kind: RowAddressType, double_rows: usize) -> Self {
        match kind {
            RowAddressType::Direct => Self::Direct { last: None },
            RowAddressType::AB => Self::AB {
                double_rows,
                last: None,
            },
        }
    }

    /// Select `row`; does nothing when it is already selected
    ///
    /// # Returns
    /// * `true` if the address lines were written
    #[allow(clippy::cast_possible_truncation)]
    pub fn select<S: PanelSink>(&mut self, sink: &mut S, row: usize) -> Result<bool, HardwareIoError> {
        match self {
            Self::Direct { last } => {
                if *last == Some(row) {
                    return Ok(false);
                }
                *last = None;
                sink.set_address_lines(row as u8)?;
                *last = Some(row);
            }
            Self::AB { double_rows, last } => {
                if *last == Some(row) {
                    return Ok(false);
                }
                *last = None;
                for bit in 0..*double_rows {
                    let data = if bit + 1 + row == *double_rows { 0 } else { LINE_B };
                    sink.set_address_lines(data)?;
                    sink.set_address_lines(data | LINE_A)?;
                }
                *last = Some(row);
            }
        }
        Ok(true)
    }

    /// Forget the selected row, forcing the next selection onto the lines
    pub fn invalidate(&mut self) {
        match self {
            Self::Direct { last } | Self::AB { last, .. } => *last = None,
        }
    }
}
