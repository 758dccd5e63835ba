//! Exclusive ownership of the panel GPIO lines

use std::sync::atomic::{AtomicBool, Ordering};

use crate::runtime::RuntimeError;

static CLAIMED: AtomicBool = AtomicBool::new(false);

/// Process-wide claim on the GPIO lines, released on drop
///
/// Sinks that do not drive real GPIO get an unclaimed lease, so any number
/// of them can coexist.
#[derive(Debug)]
pub struct GpioLease {
    claimed: bool,
}

impl GpioLease {
    /// Claim the GPIO lines when `drives_gpio` is set
    pub fn acquire(drives_gpio: bool) -> Result<Self, RuntimeError> {
        if !drives_gpio {
            return Ok(Self { claimed: false });
        }
        CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { claimed: true })
            .map_err(|_| RuntimeError::HardwareBusy)
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }
}

impl Drop for GpioLease {
    fn drop(&mut self) {
        if self.claimed {
            CLAIMED.store(false, Ordering::Release);
        }
    }
}
