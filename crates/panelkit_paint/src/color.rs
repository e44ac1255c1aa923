//! Panel colors

use serde::{Deserialize, Serialize};

/// Straight (not premultiplied) RGBA, components in 0.0..=1.0
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let [r, g, b, a] = [r, g, b, a].map(|c| f32::from(c) / 255.0);
        Self::new(r, g, b, a)
    }

    /// Scheme literal: `0xRRGGBB` is opaque, anything wider reads as `0xRRGGBBAA`
    pub fn from_hex(hex: u32) -> Self {
        let [hi, r, g, b] = hex.to_be_bytes();
        if hex > 0x00FF_FFFF {
            Self::from_rgba8(hi, r, g, b)
        } else {
            Self::from_rgba8(r, g, b, u8::MAX)
        }
    }

    /// Multiply the alpha channel, used when an element is faded
    pub fn fade(self, opacity: f32) -> Self {
        Self {
            a: self.a * opacity,
            ..self
        }
    }

    /// Quantize for raster storage, clamping out-of-range components
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex(0xFF0000), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::from_hex(0x00FF0080).to_rgba8(), [0, 255, 0, 128]);
    }

    #[test]
    fn test_fade_scales_alpha_only() {
        let c = Color::WHITE.fade(0.5);
        assert_eq!(c.a, 0.5);
        assert_eq!(c.r, 1.0);
    }

    #[test]
    fn test_to_rgba8_clamps() {
        assert_eq!(Color::new(2.0, -1.0, 0.5, 1.0).to_rgba8(), [255, 0, 127, 255]);
    }
}
