use serde::{Deserialize, Serialize};

use super::Point;

/// Axis-aligned rectangle in pixel coordinates
///
/// Signed so that derived rectangles may temporarily extend past the image;
/// call [`Region::clamp_to`] before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    /// Left edge
    pub x: i64,
    /// Top edge
    pub y: i64,
    /// Width in pixels
    pub width: i64,
    /// Height in pixels
    pub height: i64,
}

impl Region {
    /// Create a new region
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole `width` x `height` image
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i64, height as i64)
    }

    /// True when both sides are strictly positive
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Pixel area (zero for invalid regions)
    pub fn area(&self) -> i64 {
        if self.is_valid() {
            self.width * self.height
        } else {
            0
        }
    }

    /// Geometric center of the rectangle
    pub fn center(&self) -> Point {
        Point::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Sub-rectangle expressed as fractions of this one, floored to whole pixels
    pub fn sub_region(&self, fx: f64, fy: f64, fw: f64, fh: f64) -> Self {
        let w = self.width as f64;
        let h = self.height as f64;
        Self::new(
            (self.x as f64 + w * fx).floor() as i64,
            (self.y as f64 + h * fy).floor() as i64,
            (w * fw).floor() as i64,
            (h * fh).floor() as i64,
        )
    }

    /// Clip to `[0, width) x [0, height)`; `None` if nothing remains
    pub fn clamp_to(&self, width: usize, height: usize) -> Option<Self> {
        if !self.is_valid() {
            return None;
        }
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = (self.x + self.width).min(width as i64);
        let y1 = (self.y + self.height).min(height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// Approximate extent of the fruit in the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contour {
    /// Bounding box of all foreground samples
    pub bounding_box: Region,
    /// Centroid of the foreground samples
    pub center: Point,
    /// Number of foreground samples (not pixels: the locator strides)
    pub area: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside() {
        let r = Region::new(10, 10, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(r));
    }

    #[test]
    fn test_clamp_partial_overlap() {
        let r = Region::new(-5, 90, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(Region::new(0, 90, 15, 10)));
    }

    #[test]
    fn test_clamp_outside_or_empty() {
        assert_eq!(Region::new(200, 0, 10, 10).clamp_to(100, 100), None);
        assert_eq!(Region::new(0, 0, 0, 10).clamp_to(100, 100), None);
        assert_eq!(Region::new(0, 0, 10, -3).clamp_to(100, 100), None);
    }

    #[test]
    fn test_sub_region_floors() {
        let bbox = Region::new(0, 0, 101, 51);
        let lower = bbox.sub_region(0.0, 0.5, 1.0, 0.5);
        assert_eq!(lower, Region::new(0, 25, 101, 25));
    }
}
