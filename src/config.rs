use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::PixelOrder;
use crate::error::StripError;

/// Strip wiring and behavior, loadable from a YAML file. Every field has
/// a default, so a config file only needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// BCM number of the clock line.
    pub clock_pin: u8,
    /// BCM number of the data line.
    pub data_pin: u8,
    /// Pixels per line.
    pub length: usize,
    /// Parallel chains sharing the clock timing.
    pub lines: usize,
    /// Global brightness, clamped to [0, 1] on the strip.
    pub brightness: f32,
    /// Push every mutation to the strip as it happens.
    pub auto_update: bool,
    pub pixel_order: PixelOrder,
    /// SPI clock rate in hz; only a recommendation, and ignored entirely
    /// on the bit-bang path.
    pub baudrate: u32,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            clock_pin: 11,
            data_pin: 10,
            length: 1,
            lines: 1,
            brightness: 1.0,
            auto_update: true,
            pixel_order: PixelOrder::default(),
            baudrate: 4_000_000,
        }
    }
}

impl StripConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StripError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}
