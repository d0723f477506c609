//! RGBA pixel storage for the raster backend and image blits.

use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};

/// A 2D RGBA pixel buffer in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

/// Raw pixel data handed to `draw_pixels` or `load_image`.
pub type PixelImage = PixelSurface;

impl PixelSurface {
    /// Create a surface filled with transparent black.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Create a surface filled with one color.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let size = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            pixels: vec![color; size],
        }
    }

    /// Create from raw pixels.
    ///
    /// Fails when the pixel count does not match the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(Error::InvalidDimensions { width, height })?;
        if pixels.len() != expected {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create from packed 32-bit ARGB values.
    pub fn from_argb(width: u32, height: u32, argb: &[u32]) -> Result<Self> {
        Self::from_pixels(width, height, argb.iter().map(|&v| Color::from_argb(v)).collect())
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Surface bounds at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size())
    }

    /// Row-major pixel slice.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize).checked_mul(self.width as usize)?.checked_add(x as usize)?;
        (idx < self.pixels.len()).then_some(idx)
    }

    /// Get the pixel at (x, y).
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    /// Overwrite the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    /// Composite `color` over the pixel at (x, y) with partial coverage.
    pub fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        if coverage <= 0.0 {
            return;
        }
        if let Some(idx) = self.index(x, y) {
            let src = if coverage >= 1.0 {
                color
            } else {
                color.scale_alpha(coverage)
            };
            self.pixels[idx] = src.blend_over(self.pixels[idx]);
        }
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Reallocate to a new size, clearing to transparent.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Packed 32-bit ARGB pixels for presenting to a native window.
    #[must_use]
    pub fn to_argb_vec(&self) -> Vec<u32> {
        self.pixels.iter().map(|c| c.to_argb()).collect()
    }

    /// Count pixels equal to `color` inside `rect`.
    #[must_use]
    pub fn count_in(&self, rect: Rect, color: Color) -> usize {
        let Some(area) = rect.intersect(&self.bounds()) else {
            return 0;
        };
        let mut count = 0;
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                if self.get(x as u32, y as u32) == Some(color) {
                    count += 1;
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_bounds() {
        let mut s = PixelSurface::new(4, 3);
        s.set(3, 2, Color::RED);
        assert_eq!(s.get(3, 2), Some(Color::RED));
        assert_eq!(s.get(4, 0), None);
        s.set(10, 10, Color::RED);
        assert_eq!(s.pixels().len(), 12);
    }

    #[test]
    fn test_from_pixels_rejects_mismatch() {
        assert!(PixelSurface::from_pixels(2, 2, vec![Color::BLACK; 3]).is_err());
        assert!(PixelSurface::from_pixels(2, 2, vec![Color::BLACK; 4]).is_ok());
    }

    #[test]
    fn test_blend_partial_coverage() {
        let mut s = PixelSurface::filled(1, 1, Color::WHITE);
        s.blend(0, 0, Color::BLACK, 0.5);
        let px = s.get(0, 0).unwrap();
        assert!(px.r > 100 && px.r < 160, "{px:?}");
        assert_eq!(px.a, 255);
    }

    #[test]
    fn test_argb_round_trip() {
        let s = PixelSurface::filled(2, 1, Color::rgba(1, 2, 3, 4));
        let argb = s.to_argb_vec();
        assert_eq!(argb, vec![0x0401_0203; 2]);
        assert_eq!(PixelSurface::from_argb(2, 1, &argb).unwrap(), s);
    }

    #[test]
    fn test_count_in_clips_to_bounds() {
        let s = PixelSurface::filled(4, 4, Color::BLUE);
        assert_eq!(s.count_in(Rect::new(2, 2, 10, 10), Color::BLUE), 4);
        assert_eq!(s.count_in(Rect::new(5, 5, 1, 1), Color::BLUE), 0);
    }
}
