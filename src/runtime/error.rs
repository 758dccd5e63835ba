use std::fmt;

use myrtio_matrix_composer::{ConfigError, HardwareIoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeError {
    /// Invalid configuration or tunable value
    Config(ConfigError),
    /// Another controller holds the GPIO lines
    HardwareBusy,
    /// The refresh thread is already running
    AlreadyRunning,
    /// The refresh thread stopped on a hardware failure
    Hardware(HardwareIoError),
    /// The refresh thread panicked; the scan driver is lost
    RefreshPanicked,
    /// The scan driver went down with an earlier refresh thread
    DriverLost,
    /// The refresh thread could not be spawned
    Spawn,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(error) => write!(f, "invalid configuration: {error}"),
            Self::HardwareBusy => f.write_str("GPIO lines are owned by another controller"),
            Self::AlreadyRunning => f.write_str("refresh thread is already running"),
            Self::Hardware(error) => write!(f, "hardware failure: {error}"),
            Self::RefreshPanicked => f.write_str("refresh thread panicked"),
            Self::DriverLost => f.write_str("scan driver was lost with the refresh thread"),
            Self::Spawn => f.write_str("failed to spawn the refresh thread"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(error) => Some(error),
            Self::Hardware(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for RuntimeError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl From<HardwareIoError> for RuntimeError {
    fn from(error: HardwareIoError) -> Self {
        Self::Hardware(error)
    }
}
