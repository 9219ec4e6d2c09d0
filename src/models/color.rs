use serde::{Deserialize, Serialize};

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as floats, in (r, g, b) order
    #[inline]
    pub fn to_f64(self) -> (f64, f64, f64) {
        (self.r as f64, self.g as f64, self.b as f64)
    }

    /// Unweighted channel mean
    #[inline]
    pub fn brightness(self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }

    /// Floor every channel to a multiple of `step`
    #[inline]
    pub fn quantize(self, step: u8) -> Self {
        let step = step.max(1);
        Self::new(
            self.r / step * step,
            self.g / step * step,
            self.b / step * step,
        )
    }

    /// Euclidean distance in RGB space
    pub fn distance(self, other: Rgb) -> f64 {
        let (r1, g1, b1) = self.to_f64();
        let (r2, g2, b2) = other.to_f64();
        ((r1 - r2).powi(2) + (g1 - g2).powi(2) + (b1 - b2).powi(2)).sqrt()
    }

    /// Lowercase `#rrggbb`
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One dominant color bucket of a sampled region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSample {
    /// Quantized color
    pub rgb: Rgb,
    /// Hex form of `rgb`
    pub hex: String,
    /// Share of sampled pixels falling in this bucket, 0-100
    pub percentage: f64,
}

impl ColorSample {
    /// Build a sample, deriving the hex string
    pub fn new(rgb: Rgb, percentage: f64) -> Self {
        Self {
            rgb,
            hex: rgb.hex(),
            percentage,
        }
    }
}
