use crate::config::{PanelConfig, plane_nanoseconds};

/// Dwell parameters of one scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellTiming {
    pub lsb_nanoseconds: u32,
    /// Percent, 0-100
    pub brightness: u8,
}

impl DwellTiming {
    pub fn new(lsb_nanoseconds: u32, brightness: u8) -> Self {
        Self {
            lsb_nanoseconds,
            brightness,
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(config.pwm_lsb_nanoseconds(), config.brightness())
    }

    /// Output-enable time of `plane`: `2^plane × lsb × brightness / 100`
    #[inline]
    pub fn plane_nanoseconds(&self, plane: u8) -> u32 {
        plane_nanoseconds(self.lsb_nanoseconds, plane, self.brightness)
    }
}
