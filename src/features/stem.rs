use serde_json::json;
use tracing::debug;

use super::Heuristic;
use crate::config::AnalyzerConfig;
use crate::error::DetectionError;
use crate::models::result::into_details;
use crate::models::{ColorSample, Contour, Feature, FeatureResult, ImageBuffer};
use crate::utils::guard::{clamp, clamp_region};
use crate::utils::sampler::{SamplingDensity, dominant_colors};

/// Below this, both the brown match and the green penalty count as "nothing seen"
const NOT_VISIBLE_LEVEL: f64 = 10.0;

/// Stem dryness at the top center of the fruit
pub struct StemColor;

impl Heuristic for StemColor {
    const FEATURE: Feature = Feature::StemColor;

    /// Score the top-center of the bounding box: dry brown is good, green is not.
    ///
    /// When neither is present the stem is reported as not visible with a
    /// neutral score, which the aggregator uses to reassign the stem weight.
    fn evaluate(
        image: &ImageBuffer,
        contour: &Contour,
        config: &AnalyzerConfig,
    ) -> Result<FeatureResult, DetectionError> {
        let search = contour.bounding_box.sub_region(0.3, 0.0, 0.4, 0.3);
        let search = clamp_region(search, image)?;

        let colors = dominant_colors(image, Some(search), SamplingDensity::Coarse, &config.sampler);

        let mut brown_score = 0.0f64;
        let mut green_penalty = 0.0f64;
        let mut best_stem: Option<&ColorSample> = None;
        for color in &colors {
            let score = dry_brown_score(color);
            if score > brown_score {
                brown_score = score;
                best_stem = Some(color);
            }
            green_penalty += green_penalty_for(color);
        }

        let mut score = clamp(brown_score - green_penalty, 0.0, 100.0);
        let mut stem_visible = true;
        let description = if brown_score < NOT_VISIBLE_LEVEL && green_penalty < NOT_VISIBLE_LEVEL {
            score = config.stem.neutral_score;
            stem_visible = false;
            "Stem not visible in image - neutral score applied"
        } else if score > 75.0 {
            "Excellent brown/dry stem - vine ripened"
        } else if score > 50.0 {
            "Moderate stem dryness"
        } else if green_penalty > 20.0 {
            "Green stem detected - may be picked early"
        } else if score > 25.0 {
            "Stem appears partially dry"
        } else if score > 10.0 {
            "Stem condition unclear"
        } else {
            score = score.max(config.stem.partial_floor);
            "Stem condition poor but partially visible"
        };

        debug!(score, brown_score, green_penalty, stem_visible, "stem");

        let details = into_details(json!({
            "dominantColors": colors,
            "bestStemColor": best_stem,
            "brownScore": brown_score,
            "greenPenalty": green_penalty,
            "searchRegion": search,
            "stemVisible": stem_visible,
        }));
        Ok(FeatureResult::new(score, description, details))
    }
}

/// Score for a dry, brown stem color; 0 when the color is not in the brown band
pub(crate) fn dry_brown_score(color: &ColorSample) -> f64 {
    let (r, g, b) = color.rgb.to_f64();
    let brownness = r.min(g * 0.8).min(b * 0.6);
    let is_dry_brown = r > 80.0
        && r < 180.0
        && g > 60.0
        && g < 150.0
        && b > 40.0
        && b < 120.0
        && (r - g).abs() < 50.0
        && r > b;
    if !is_dry_brown {
        return 0.0;
    }
    (brownness / 80.0 * 70.0 + color.percentage / 15.0 * 30.0).min(100.0)
}

/// Penalty contributed by a clearly green color, proportional to its share
pub(crate) fn green_penalty_for(color: &ColorSample) -> f64 {
    let (r, g, b) = color.rgb.to_f64();
    let greenness = g - (r + b) / 2.0;
    if greenness > 30.0 && g > 100.0 {
        color.percentage / 100.0 * 40.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Region, Rgb};

    fn image_with_top(w: usize, h: usize, top: [u8; 3], rest: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity(w * h * 4);
        for y in 0..h {
            for _x in 0..w {
                let c = if y < h * 3 / 10 { top } else { rest };
                data.extend_from_slice(&[c[0], c[1], c[2], 255]);
            }
        }
        data
    }

    fn contour(w: usize, h: usize) -> Contour {
        let bbox = Region::full(w, h);
        Contour {
            bounding_box: bbox,
            center: bbox.center(),
            area: w * h,
        }
    }

    #[test]
    fn test_green_top_is_penalized_and_visible() {
        let data = image_with_top(100, 100, [60, 160, 50], [60, 120, 60]);
        let image = ImageBuffer::from_rgba(&data, 100, 100).unwrap();
        let result = StemColor::analyze(&image, &contour(100, 100), &AnalyzerConfig::default());
        assert_eq!(result.stem_visible(), Some(true));
        assert_eq!(result.score, 0);
        assert_eq!(result.description, "Green stem detected - may be picked early");
        assert_eq!(result.details["greenPenalty"], json!(40.0));
    }

    #[test]
    fn test_no_stem_is_neutral() {
        let data = image_with_top(100, 100, [200, 60, 200], [200, 60, 200]);
        let image = ImageBuffer::from_rgba(&data, 100, 100).unwrap();
        let result = StemColor::analyze(&image, &contour(100, 100), &AnalyzerConfig::default());
        assert_eq!(result.stem_visible(), Some(false));
        assert_eq!(result.score, 65);
    }

    #[test]
    fn test_dry_brown_stem_scores_high() {
        let data = image_with_top(100, 100, [140, 110, 70], [60, 120, 60]);
        let image = ImageBuffer::from_rgba(&data, 100, 100).unwrap();
        let result = StemColor::analyze(&image, &contour(100, 100), &AnalyzerConfig::default());
        assert_eq!(result.stem_visible(), Some(true));
        assert_eq!(result.score, 100);
        assert!(result.description.starts_with("Excellent"));
    }

    #[test]
    fn test_faint_green_is_floored_as_partially_visible() {
        // stem window is x 30..70, y 0..30 sampled every 2px; x < 46 is 8 of 20 columns
        let (w, h) = (100usize, 100usize);
        let mut data = Vec::with_capacity(w * h * 4);
        for _y in 0..h {
            for x in 0..w {
                let c = if x < 46 { [60, 160, 50] } else { [200, 60, 200] };
                data.extend_from_slice(&[c[0], c[1], c[2], 255]);
            }
        }
        let image = ImageBuffer::from_rgba(&data, w, h).unwrap();
        let result = StemColor::analyze(&image, &contour(w, h), &AnalyzerConfig::default());
        assert_eq!(result.stem_visible(), Some(true));
        assert_eq!(result.score, 35);
        assert_eq!(result.description, "Stem condition poor but partially visible");
        let penalty = result.details["greenPenalty"].as_f64().unwrap();
        assert!((penalty - 16.0).abs() < 1e-9, "penalty {}", penalty);
        assert_eq!(result.details["brownScore"], json!(0.0));
    }

    #[test]
    fn test_brown_band_rejects_grey() {
        let grey = ColorSample::new(Rgb::new(128, 128, 128), 100.0);
        assert_eq!(dry_brown_score(&grey), 0.0);
    }
}
