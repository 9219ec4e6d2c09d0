use serde_json::json;
use tracing::debug;

use super::Heuristic;
use crate::config::AnalyzerConfig;
use crate::error::DetectionError;
use crate::models::result::into_details;
use crate::models::{Contour, Feature, FeatureResult, ImageBuffer};
use crate::utils::guard::{clamp, round_to, safe_divide};

/// Rind gloss from brightness variation
pub struct SkinDullness;

impl Heuristic for SkinDullness {
    const FEATURE: Feature = Feature::SkinDullness;

    /// Brightness uniformity in a square window at the box center.
    ///
    /// Low variation reads as a matte rind; mid-range brightness is preferred.
    fn evaluate(
        image: &ImageBuffer,
        contour: &Contour,
        config: &AnalyzerConfig,
    ) -> Result<FeatureResult, DetectionError> {
        let bbox = contour.bounding_box;
        let center_x = (bbox.x as f64 + bbox.width as f64 / 2.0).floor();
        let center_y = (bbox.y as f64 + bbox.height as f64 / 2.0).floor();
        let region_size = bbox.width.min(bbox.height) as f64 * config.dullness.region_fraction;
        let half = region_size / 2.0;
        let step = config.dullness.stride.max(1) as f64;

        let mut samples = Vec::new();
        let mut y = center_y - half;
        while y < center_y + half {
            let mut x = center_x - half;
            while x < center_x + half {
                if let Some(color) = image.rgb_at(x.floor() as i64, y.floor() as i64) {
                    samples.push(color.brightness());
                }
                x += step;
            }
            y += step;
        }

        if samples.len() < config.dullness.min_samples {
            return Err(DetectionError::InsufficientSamples {
                found: samples.len(),
                required: config.dullness.min_samples,
            });
        }

        let n = samples.len() as f64;
        let mean = safe_divide(samples.iter().sum(), n);
        let variance = safe_divide(samples.iter().map(|v| (v - mean).powi(2)).sum(), n);
        let std_dev = variance.sqrt();

        let variation_score = clamp(100.0 - std_dev * 2.0, 0.0, 100.0);
        let brightness_score = clamp(100.0 - (mean - 128.0).abs() / 128.0 * 100.0, 0.0, 100.0);
        let score = clamp(variation_score * 0.7 + brightness_score * 0.3, 0.0, 100.0).round();

        debug!(score, mean, std_dev, samples = samples.len(), "skin dullness");

        let details = into_details(json!({
            "pixelCount": samples.len(),
            "avgBrightness": round_to(mean, 1),
            "stdDev": round_to(std_dev, 1),
            "variationScore": variation_score.round(),
            "brightnessScore": brightness_score.round(),
            "centerX": center_x,
            "centerY": center_y,
            "regionSize": region_size.round(),
        }));
        Ok(FeatureResult::new(score, describe(score), details))
    }

    fn fallback_description(err: &DetectionError) -> String {
        format!("Skin analysis unavailable - {}", err)
    }
}

fn describe(score: f64) -> &'static str {
    if score > 75.0 {
        "Excellent dull skin - indicates maturity"
    } else if score > 60.0 {
        "Good skin dullness"
    } else if score > 45.0 {
        "Moderate skin dullness"
    } else if score > 30.0 {
        "Somewhat shiny skin - may be underripe"
    } else {
        "Shiny skin detected - likely underripe"
    }
}
