use crate::{RuntimeStatus, SharedState};

/// A snapshot of the refresh loop for external systems.
///
/// This DTO captures the observable state without exposing the shared atomics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshSnapshot {
    pub status: RuntimeStatus,
    /// Brightness in percent
    pub brightness: u8,
    pub pwm_bits: u8,
    pub luminance_correct: bool,
    /// Smoothed refresh rate
    pub refresh_rate_hz: u32,
    /// Completed scan cycles
    pub cycles: u64,
    /// Longest scan cycle in microseconds
    pub longest_cycle_us: u32,
}

impl RefreshSnapshot {
    /// Create a snapshot from the shared state
    pub fn from_shared(shared: &SharedState) -> Self {
        let tunables = shared.tunables();
        Self {
            status: shared.status(),
            brightness: tunables.brightness,
            pwm_bits: tunables.pwm_bits,
            luminance_correct: tunables.luminance_correct,
            refresh_rate_hz: shared.refresh_rate_hz(),
            cycles: shared.cycles(),
            longest_cycle_us: shared.longest_cycle_us(),
        }
    }
}
