//! Dominant color extraction.
//!
//! Samples a region on a stride proportional to `sqrt(area)`, quantizes each
//! channel down to a multiple of the configured step and ranks the buckets by
//! frequency.

use std::collections::HashMap;

use crate::config::SamplerConfig;
use crate::models::{ColorSample, ImageBuffer, Region, Rgb};
use crate::utils::guard::safe_divide;

/// How densely a region is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingDensity {
    /// About 50 samples per side
    Coarse,
    /// About 150 samples per side, for small subtle areas such as the field spot
    Fine,
}

/// Stride used for a region of `area` pixels
pub fn sampling_stride(area: i64, density: SamplingDensity, config: &SamplerConfig) -> usize {
    let (divisor, min_stride) = match density {
        SamplingDensity::Coarse => (config.coarse_divisor, config.coarse_min_stride),
        SamplingDensity::Fine => (config.fine_divisor, config.fine_min_stride),
    };
    let raw = safe_divide((area.max(0) as f64).sqrt(), divisor).floor() as usize;
    raw.max(min_stride).max(1)
}

/// Top `config.top_n` quantized colors of `region` (whole image when `None`)
///
/// Percentages are relative to all sampled pixels. An empty or out-of-bounds
/// region yields an empty list.
pub fn dominant_colors(
    image: &ImageBuffer,
    region: Option<Region>,
    density: SamplingDensity,
    config: &SamplerConfig,
) -> Vec<ColorSample> {
    let region = region.unwrap_or_else(|| Region::full(image.width(), image.height()));
    let Some(roi) = region.clamp_to(image.width(), image.height()) else {
        return Vec::new();
    };

    let stride = sampling_stride(roi.area(), density, config);
    let mut buckets: Vec<(Rgb, usize)> = Vec::new();
    let mut index: HashMap<Rgb, usize> = HashMap::new();
    let mut sampled = 0usize;

    let (x0, y0) = (roi.x as usize, roi.y as usize);
    let (x1, y1) = (x0 + roi.width as usize, y0 + roi.height as usize);
    for y in (y0..y1).step_by(stride) {
        for x in (x0..x1).step_by(stride) {
            let Some(color) = image.rgb(x, y) else {
                continue;
            };
            let key = color.quantize(config.quantization);
            match index.get(&key) {
                Some(&slot) => buckets[slot].1 += 1,
                None => {
                    index.insert(key, buckets.len());
                    buckets.push((key, 1));
                }
            }
            sampled += 1;
        }
    }

    // Stable sort keeps first-seen order among equal counts
    buckets.sort_by(|a, b| b.1.cmp(&a.1));
    buckets.truncate(config.top_n);

    buckets
        .into_iter()
        .map(|(rgb, count)| {
            ColorSample::new(rgb, safe_divide(count as f64, sampled as f64) * 100.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        data
    }

    #[test]
    fn test_uniform_image_single_color() {
        let data = solid(64, 64, [230, 200, 60]);
        let image = ImageBuffer::from_rgba(&data, 64, 64).unwrap();
        let colors = dominant_colors(&image, None, SamplingDensity::Coarse, &SamplerConfig::default());
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].rgb, Rgb::new(224, 192, 32));
        assert_eq!(colors[0].percentage, 100.0);
        assert_eq!(colors[0].hex, "#e0c020");
    }

    #[test]
    fn test_zero_sized_region_is_empty() {
        let data = solid(16, 16, [10, 10, 10]);
        let image = ImageBuffer::from_rgba(&data, 16, 16).unwrap();
        let config = SamplerConfig::default();
        let empty_w = dominant_colors(&image, Some(Region::new(0, 0, 0, 8)), SamplingDensity::Fine, &config);
        let empty_h = dominant_colors(&image, Some(Region::new(0, 0, 8, 0)), SamplingDensity::Coarse, &config);
        assert!(empty_w.is_empty());
        assert!(empty_h.is_empty());
    }

    #[test]
    fn test_sorted_by_frequency_and_truncated() {
        // Left three quarters dark, right quarter light
        let (w, h) = (40usize, 40usize);
        let mut data = Vec::with_capacity(w * h * 4);
        for _y in 0..h {
            for x in 0..w {
                if x < 30 {
                    data.extend_from_slice(&[40, 40, 40, 255]);
                } else {
                    data.extend_from_slice(&[220, 220, 220, 255]);
                }
            }
        }
        let image = ImageBuffer::from_rgba(&data, w, h).unwrap();
        let config = SamplerConfig {
            top_n: 1,
            ..SamplerConfig::default()
        };
        let colors = dominant_colors(&image, None, SamplingDensity::Fine, &config);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].rgb, Rgb::new(32, 32, 32));
        assert!((colors[0].percentage - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_stride_scales_with_area() {
        let config = SamplerConfig::default();
        assert_eq!(sampling_stride(100, SamplingDensity::Coarse, &config), 2);
        assert_eq!(sampling_stride(100, SamplingDensity::Fine, &config), 1);
        assert_eq!(sampling_stride(1000 * 1000, SamplingDensity::Coarse, &config), 20);
        assert_eq!(sampling_stride(0, SamplingDensity::Fine, &config), 1);
    }
}
