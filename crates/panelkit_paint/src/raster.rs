//! RGBA8 rasters for decoded images and offscreen buffers

use crate::color::Color;

/// An RGBA8 pixel buffer, row-major without padding
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Byte length of a `width` x `height` RGBA8 buffer, `None` on overflow
fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
}

impl Raster {
    /// Create a fully transparent raster.
    ///
    /// # Panics
    ///
    /// Panics if the buffer size overflows `usize`.
    pub fn new(width: u32, height: u32) -> Self {
        match Self::try_new(width, height) {
            Some(raster) => raster,
            None => panic!("Raster size overflow {width}x{height}"),
        }
    }

    /// Fallible [`new`](Self::new); `None` when the buffer can't be sized or allocated
    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        let mut raster = Self::default();
        raster.reset(width, height).then_some(raster)
    }

    /// Wrap existing RGBA data; `None` when the length doesn't match
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if byte_len(width, height) != Some(pixels.len()) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Resize in place, keeping the allocation when possible. Contents are
    /// cleared to transparent.
    ///
    /// Returns false and leaves an empty raster when the requested size
    /// overflows or can't be allocated.
    pub fn reset(&mut self, width: u32, height: u32) -> bool {
        self.pixels.clear();
        let Some(len) = byte_len(width, height) else {
            self.width = 0;
            self.height = 0;
            return false;
        };
        if self.pixels.try_reserve_exact(len).is_err() {
            self.width = 0;
            self.height = 0;
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixels.resize(len, 0);
        true
    }

    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// True when every pixel equals the first one
    pub fn is_uniform(&self) -> bool {
        match self.pixels.get(0..4) {
            Some(first) => self.pixels.chunks_exact(4).all(|px| px == first),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Raster::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(Raster::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_fill_and_pixel() {
        let mut raster = Raster::new(3, 2);
        raster.fill(Color::WHITE);
        assert_eq!(raster.pixel(2, 1), Some([255, 255, 255, 255]));
        assert_eq!(raster.pixel(3, 0), None);
        assert!(raster.is_uniform());

        raster.set_pixel(0, 0, [1, 2, 3, 4]);
        assert!(!raster.is_uniform());
    }

    #[test]
    fn test_reset_clears() {
        let mut raster = Raster::new(2, 2);
        raster.fill(Color::BLACK);
        raster.reset(1, 3);
        assert_eq!(raster.pixels().len(), 12);
        assert_eq!(raster.pixel(0, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_oversized_reset_leaves_empty_raster() {
        let mut raster = Raster::new(2, 2);
        assert!(!raster.reset(u32::MAX, u32::MAX));
        assert!(raster.is_empty());
        assert!(raster.pixels().is_empty());
        assert!(Raster::try_new(u32::MAX, u32::MAX).is_none());

        assert!(raster.reset(2, 1));
        assert_eq!(raster.pixels().len(), 8);
    }

    #[test]
    #[should_panic(expected = "Raster size overflow")]
    fn test_new_overflow_panics() {
        Raster::new(u32::MAX, u32::MAX);
    }
}
