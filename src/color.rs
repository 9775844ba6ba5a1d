use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StripError;

/// Order in which the three color channels occupy a pixel frame's bytes.
///
/// Different strips wire this differently. If you send red and the strip
/// shows blue or green, change this. BGR is the common DotStar layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelOrder {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    #[default]
    Bgr,
}

impl PixelOrder {
    /// Which input channel (0 = R, 1 = G, 2 = B) lands in each frame slot.
    pub(crate) fn slots(self) -> [usize; 3] {
        match self {
            PixelOrder::Rgb => [0, 1, 2],
            PixelOrder::Rbg => [0, 2, 1],
            PixelOrder::Grb => [1, 0, 2],
            PixelOrder::Gbr => [1, 2, 0],
            PixelOrder::Brg => [2, 0, 1],
            PixelOrder::Bgr => [2, 1, 0],
        }
    }
}

impl FromStr for PixelOrder {
    type Err = StripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(PixelOrder::Rgb),
            "rbg" => Ok(PixelOrder::Rbg),
            "grb" => Ok(PixelOrder::Grb),
            "gbr" => Ok(PixelOrder::Gbr),
            "brg" => Ok(PixelOrder::Brg),
            "bgr" => Ok(PixelOrder::Bgr),
            other => Err(StripError::UnknownOrder(other.to_string())),
        }
    }
}

/// A color handed to a pixel write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgb(u8, u8, u8),
    /// Color plus per-pixel brightness in [0, 1].
    ///
    /// Per-pixel brightness is PWMed by the LED itself at a much lower
    /// frequency than the color channels, which can matter for
    /// persistence-of-vision use.
    Rgba(u8, u8, u8, f32),
    /// Packed 0xRRGGBB.
    Packed(u32),
}

impl Color {
    /// Normalize to `[r, g, b]` plus per-pixel brightness. Brightness
    /// defaults to full and is clamped to [0, 1].
    pub(crate) fn channels(self) -> ([u8; 3], f32) {
        match self {
            Color::Rgb(r, g, b) => ([r, g, b], 1.0),
            Color::Rgba(r, g, b, pb) => ([r, g, b], pb.clamp(0.0, 1.0)),
            Color::Packed(v) => ([(v >> 16) as u8, (v >> 8) as u8, v as u8], 1.0),
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::Rgb(r, g, b)
    }
}

impl From<(u8, u8, u8, f32)> for Color {
    fn from((r, g, b, pb): (u8, u8, u8, f32)) -> Self {
        Color::Rgba(r, g, b, pb)
    }
}

impl From<u32> for Color {
    fn from(packed: u32) -> Self {
        Color::Packed(packed)
    }
}
