//! Shared refresh state for external observation
//!
//! Lets the application tune and observe the refresh loop without direct
//! access to the scan driver. All fields are atomics; the refresh loop reads
//! the tunables at the start of every cycle and publishes telemetry at its
//! end.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};

use crate::config::PanelConfig;

/// Weight of the newest sample in the cycle time average is `1 / SMOOTHING`
const SMOOTHING: u64 = 8;

/// Refresh loop status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RuntimeStatus {
    Stopped = 0,
    Running = 1,
    /// Stopped by a hardware failure
    Faulted = 2,
}

impl From<u8> for RuntimeStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Faulted,
            _ => Self::Stopped,
        }
    }
}

/// Values applied at the start of every scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tunables {
    /// Percent, 0-100
    pub brightness: u8,
    pub pwm_bits: u8,
    pub luminance_correct: bool,
}

pub struct SharedState {
    brightness: AtomicU8,
    pwm_bits: AtomicU8,
    luminance_correct: AtomicBool,
    status: AtomicU8,
    stop_requested: AtomicBool,
    cycles: AtomicU64,
    /// Smoothed cycle time in microseconds
    average_cycle_us: AtomicU32,
    longest_cycle_us: AtomicU32,
}

impl SharedState {
    pub const fn new(tunables: Tunables) -> Self {
        Self {
            brightness: AtomicU8::new(tunables.brightness),
            pwm_bits: AtomicU8::new(tunables.pwm_bits),
            luminance_correct: AtomicBool::new(tunables.luminance_correct),
            status: AtomicU8::new(RuntimeStatus::Stopped as u8),
            stop_requested: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
            average_cycle_us: AtomicU32::new(0),
            longest_cycle_us: AtomicU32::new(0),
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(Tunables {
            brightness: config.brightness(),
            pwm_bits: config.pwm_bits(),
            luminance_correct: config.luminance_correct(),
        })
    }

    // === Tunables ===

    pub fn tunables(&self) -> Tunables {
        Tunables {
            brightness: self.brightness(),
            pwm_bits: self.pwm_bits(),
            luminance_correct: self.luminance_correct(),
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness.load(Ordering::Relaxed)
    }

    /// Set brightness; callers validate the range
    pub fn set_brightness(&self, value: u8) {
        self.brightness.store(value, Ordering::Relaxed);
    }

    pub fn pwm_bits(&self) -> u8 {
        self.pwm_bits.load(Ordering::Relaxed)
    }

    /// Set plane count; callers validate the range
    pub fn set_pwm_bits(&self, value: u8) {
        self.pwm_bits.store(value, Ordering::Relaxed);
    }

    pub fn luminance_correct(&self) -> bool {
        self.luminance_correct.load(Ordering::Relaxed)
    }

    pub fn set_luminance_correct(&self, enabled: bool) {
        self.luminance_correct.store(enabled, Ordering::Relaxed);
    }

    // === Lifecycle ===

    pub fn status(&self) -> RuntimeStatus {
        self.status.load(Ordering::Acquire).into()
    }

    pub fn set_status(&self, status: RuntimeStatus) {
        self.status.store(status as u8, Ordering::Release);
    }

    /// Ask the refresh loop to exit after the current cycle
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn clear_stop(&self) {
        self.stop_requested.store(false, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // === Telemetry ===

    /// Record a completed cycle that took `micros`
    pub fn record_cycle(&self, micros: u32) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.longest_cycle_us.fetch_max(micros, Ordering::Relaxed);

        let average = self.average_cycle_us.load(Ordering::Relaxed);
        let next = if average == 0 {
            micros
        } else {
            let smoothed = (u64::from(average) * (SMOOTHING - 1) + u64::from(micros)) / SMOOTHING;
            u32::try_from(smoothed).unwrap_or(u32::MAX)
        };
        // Single writer, a plain store is enough.
        self.average_cycle_us.store(next.max(1), Ordering::Relaxed);
    }

    /// Completed cycles since creation
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn average_cycle_us(&self) -> u32 {
        self.average_cycle_us.load(Ordering::Relaxed)
    }

    pub fn longest_cycle_us(&self) -> u32 {
        self.longest_cycle_us.load(Ordering::Relaxed)
    }

    /// Smoothed refresh rate in Hz, 0 before the first cycle
    pub fn refresh_rate_hz(&self) -> u32 {
        match self.average_cycle_us() {
            0 => 0,
            average => 1_000_000 / average,
        }
    }
}
