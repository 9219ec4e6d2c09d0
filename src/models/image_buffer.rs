use crate::error::{AnalysisError, Result};
use crate::models::Rgb;

/// Bytes per pixel in the RGBA layout every analysis stage expects
pub const CHANNELS: usize = 4;

/// Borrowed, immutable view over an RGBA pixel grid
///
/// The caller owns the pixel data for the duration of an analysis. Row-major,
/// 4 bytes per pixel (red, green, blue, alpha).
#[derive(Debug, Clone, Copy)]
pub struct ImageBuffer<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> ImageBuffer<'a> {
    /// Wrap raw RGBA bytes, validating dimensions against the buffer length
    pub fn from_rgba(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidImage {
                reason: format!("image has zero dimension ({}x{})", width, height),
            });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| AnalysisError::InvalidImage {
                reason: format!("image dimensions overflow ({}x{})", width, height),
            })?;
        if data.len() != expected {
            return Err(AnalysisError::InvalidImage {
                reason: format!(
                    "buffer holds {} bytes, expected {} for {}x{} RGBA",
                    data.len(),
                    expected,
                    width,
                    height
                ),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Borrow the pixels of a decoded `image` crate buffer
    pub fn from_image(image: &'a image::RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_rgba(image.as_raw(), width as usize, height as usize)
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.data
    }

    /// Color of the pixel at (x, y), or `None` when out of bounds
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * CHANNELS;
        Some(Rgb::new(
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
        ))
    }

    /// Like [`ImageBuffer::rgb`] but accepts signed coordinates
    #[inline]
    pub fn rgb_at(&self, x: i64, y: i64) -> Option<Rgb> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rgb(x as usize, y as usize)
    }
}
