use std::hint::spin_loop;
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// Dwells shorter than this are busy-waited
const DEFAULT_SPIN_BELOW: Duration = Duration::from_micros(100);

/// Host delay for [`SimulatedSink`](myrtio_matrix_composer::SimulatedSink)
/// and GPIO sinks
///
/// Short waits spin on the monotonic clock, long ones sleep the thread.
#[derive(Debug, Clone, Copy)]
pub struct StdDelay {
    spin_below: Duration,
}

impl StdDelay {
    pub const fn new() -> Self {
        Self {
            spin_below: DEFAULT_SPIN_BELOW,
        }
    }

    /// Delay that busy-waits everything shorter than `spin_below`
    pub const fn with_spin_below(spin_below: Duration) -> Self {
        Self { spin_below }
    }
}

impl Default for StdDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        let duration = Duration::from_nanos(u64::from(ns));
        if duration >= self.spin_below {
            thread::sleep(duration);
            return;
        }
        let start = Instant::now();
        while start.elapsed() < duration {
            spin_loop();
        }
    }
}
