use serde_json::json;
use tracing::debug;

use super::Heuristic;
use crate::config::AnalyzerConfig;
use crate::error::DetectionError;
use crate::models::result::into_details;
use crate::models::{ColorSample, Contour, Feature, FeatureResult, ImageBuffer};
use crate::utils::guard::clamp_region;
use crate::utils::sampler::{SamplingDensity, dominant_colors};

/// Field spot coloration in the lower half of the fruit
pub struct FieldSpotColor;

impl Heuristic for FieldSpotColor {
    const FEATURE: Feature = Feature::FieldSpotColor;

    /// Look for yellow, cream or tan in the lower half of the bounding box.
    fn evaluate(
        image: &ImageBuffer,
        contour: &Contour,
        config: &AnalyzerConfig,
    ) -> Result<FeatureResult, DetectionError> {
        let search = contour.bounding_box.sub_region(0.0, 0.5, 1.0, 0.5);
        let search = clamp_region(search, image)?;

        let colors = dominant_colors(image, Some(search), SamplingDensity::Fine, &config.sampler);

        let mut best_score = 0.0f64;
        let mut best_color: Option<&ColorSample> = None;
        for color in &colors {
            let score = yellow_match_score(color);
            if score > best_score {
                best_score = score;
                best_color = Some(color);
            }
        }

        let score = best_score.min(100.0);
        debug!(score, colors = colors.len(), "field spot");

        let details = into_details(json!({
            "dominantColors": colors,
            "bestYellowColor": best_color,
            "searchRegion": search,
        }));
        Ok(FeatureResult::new(score, describe(score), details))
    }
}

/// Whether a color falls in any of the yellow/cream/tan families
fn is_yellowish(r: f64, g: f64, b: f64) -> bool {
    let brightness = (r + g + b) / 3.0;
    (r > g && g > b && brightness > 80.0)
        || (r > g && r > b && g > b * 1.1 && brightness > 90.0)
        || (r >= g && g >= b && r > b * 1.2 && brightness > 70.0)
        || ((r - g).abs() < 30.0 && r > b * 1.3 && brightness > 85.0)
}

/// Tiered score for one dominant color; 0 if it is not field-spot colored
pub(crate) fn yellow_match_score(color: &ColorSample) -> f64 {
    let (r, g, b) = color.rgb.to_f64();
    if !is_yellowish(r, g, b) {
        return 0.0;
    }
    let yellowness = (r + g) / 2.0 - b;
    let brightness = (r + g + b) / 3.0;
    let pct = color.percentage;

    if yellowness > 40.0 && r > 140.0 && g > 110.0 && b < 110.0 {
        // strong yellow
        (yellowness / 80.0 * 70.0 + pct / 15.0 * 30.0).min(100.0)
    } else if yellowness > 15.0 && r > 110.0 && g > 90.0 && b < 130.0 {
        // cream
        (yellowness / 60.0 * 45.0 + pct / 20.0 * 25.0).min(70.0)
    } else if yellowness > 5.0 && r > 85.0 && g > 75.0 && b < 140.0 {
        // pale cream
        (yellowness / 40.0 * 30.0 + pct / 25.0 * 20.0).min(50.0)
    } else if yellowness > 0.0 && r > 75.0 && g > 65.0 && b < 150.0 && brightness > 70.0 {
        (yellowness / 30.0 * 20.0 + pct / 30.0 * 15.0).min(35.0)
    } else if r >= g && g >= b && r > b * 1.1 && brightness > 60.0 && brightness < 180.0 {
        // light tan / beige
        ((r - b) / 4.0 + pct / 40.0 * 10.0).min(25.0)
    } else {
        0.0
    }
}

fn describe(score: f64) -> &'static str {
    if score > 70.0 {
        "Excellent yellow field spot - indicates good ripeness"
    } else if score > 45.0 {
        "Good field spot coloring"
    } else if score > 25.0 {
        "Moderate field spot - some ripeness indicators"
    } else if score >= 10.0 {
        "Faint field spot - minimal ripeness indicators"
    } else if score > 5.0 {
        "Very faint field spot - likely underripe"
    } else {
        "No clear field spot detected"
    }
}
