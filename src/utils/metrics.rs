//! Whole-image diagnostics: channel histograms and brightness/contrast.

use rayon::prelude::*;
use serde::Serialize;

use crate::models::image_buffer::CHANNELS;
use crate::models::{ImageBuffer, Region};
use crate::utils::guard::safe_divide;

/// Perceived luminance weights (ITU-R BT.601)
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Normalized per-channel histograms of a region
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorHistogram {
    /// Red channel, 256 bins summing to 1 (or all zero)
    pub red: Vec<f64>,
    /// Green channel
    pub green: Vec<f64>,
    /// Blue channel
    pub blue: Vec<f64>,
    /// Pixels counted
    pub pixel_count: usize,
}

/// Brightness and contrast summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageMetrics {
    /// Mean perceived brightness, 0-255
    pub brightness: f64,
    /// Standard deviation of perceived brightness
    pub contrast: f64,
    /// `brightness / 255`
    pub normalized_brightness: f64,
    /// `contrast / 128`
    pub normalized_contrast: f64,
}

/// Per-channel histograms over `region` (whole image when `None`)
pub fn color_histogram(image: &ImageBuffer, region: Option<Region>) -> ColorHistogram {
    let mut red = [0usize; 256];
    let mut green = [0usize; 256];
    let mut blue = [0usize; 256];
    let mut pixel_count = 0usize;

    let region = region.unwrap_or_else(|| Region::full(image.width(), image.height()));
    if let Some(roi) = region.clamp_to(image.width(), image.height()) {
        for y in roi.y as usize..(roi.y + roi.height) as usize {
            for x in roi.x as usize..(roi.x + roi.width) as usize {
                if let Some(c) = image.rgb(x, y) {
                    red[c.r as usize] += 1;
                    green[c.g as usize] += 1;
                    blue[c.b as usize] += 1;
                    pixel_count += 1;
                }
            }
        }
    }

    let normalize =
        |hist: &[usize; 256]| -> Vec<f64> { hist.iter().map(|&n| safe_divide(n as f64, pixel_count as f64)).collect() };

    ColorHistogram {
        red: normalize(&red),
        green: normalize(&green),
        blue: normalize(&blue),
        pixel_count,
    }
}

/// Mean perceived brightness and its standard deviation over the whole image
pub fn image_metrics(image: &ImageBuffer) -> ImageMetrics {
    let row_bytes = image.width() * CHANNELS;
    let (sum, sum_sq, count) = image
        .as_bytes()
        .par_chunks(row_bytes)
        .map(|row| {
            let mut sum = 0.0f64;
            let mut sum_sq = 0.0f64;
            for px in row.chunks_exact(CHANNELS) {
                let lum = LUMA_R * px[0] as f64 + LUMA_G * px[1] as f64 + LUMA_B * px[2] as f64;
                sum += lum;
                sum_sq += lum * lum;
            }
            (sum, sum_sq, row.len() / CHANNELS)
        })
        .reduce(|| (0.0, 0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2));

    let n = count as f64;
    let brightness = safe_divide(sum, n);
    let variance = (safe_divide(sum_sq, n) - brightness * brightness).max(0.0);
    let contrast = variance.sqrt();

    ImageMetrics {
        brightness,
        contrast,
        normalized_brightness: brightness / 255.0,
        normalized_contrast: contrast / 128.0,
    }
}
