use serde_json::json;
use tracing::debug;

use super::Heuristic;
use crate::config::AnalyzerConfig;
use crate::error::DetectionError;
use crate::models::result::into_details;
use crate::models::{Contour, Feature, FeatureResult, ImageBuffer};
use crate::utils::guard::{round_to, safe_divide};

const IDEAL_RATIO: f64 = 1.0;

/// Roundness from the bounding box
pub struct ShapeRatio;

impl Heuristic for ShapeRatio {
    const FEATURE: Feature = Feature::ShapeRatio;

    fn evaluate(
        _image: &ImageBuffer,
        contour: &Contour,
        _config: &AnalyzerConfig,
    ) -> Result<FeatureResult, DetectionError> {
        let bbox = contour.bounding_box;
        if bbox.width <= 0 || bbox.height <= 0 {
            return Err(DetectionError::DegenerateContour);
        }

        let aspect_ratio = aspect_ratio(bbox.width as f64, bbox.height as f64);
        let deviation = (aspect_ratio - IDEAL_RATIO).abs();
        let score = shape_score(aspect_ratio);
        let (shape_type, description) = classify(aspect_ratio);

        debug!(score, aspect_ratio, shape_type, "shape");

        let details = into_details(json!({
            "aspectRatio": round_to(aspect_ratio, 2),
            "width": bbox.width,
            "height": bbox.height,
            "shapeType": shape_type,
            "ratioDeviation": round_to(deviation, 2),
        }));
        Ok(FeatureResult::new(score, description, details))
    }
}

/// width / height, 1 when height is zero
pub fn aspect_ratio(width: f64, height: f64) -> f64 {
    if height == 0.0 {
        IDEAL_RATIO
    } else {
        safe_divide(width, height)
    }
}

/// Linear penalty on distance from 1, boosted near round and cut when elongated
pub fn shape_score(aspect_ratio: f64) -> f64 {
    let deviation = (aspect_ratio - IDEAL_RATIO).abs();
    let base = (100.0 - deviation * 100.0).max(0.0);
    if (0.95..=1.05).contains(&aspect_ratio) {
        (base * 1.2).min(100.0)
    } else if (1.05..=1.15).contains(&aspect_ratio) {
        (base * 1.1).min(100.0)
    } else if deviation > 0.3 {
        base * 0.7
    } else {
        base
    }
}

fn classify(aspect_ratio: f64) -> (&'static str, &'static str) {
    if aspect_ratio < 0.7 {
        ("very tall/narrow", "Very elongated shape - likely watery")
    } else if aspect_ratio < 0.85 {
        ("tall/oval", "Tall oval shape - may be watery")
    } else if aspect_ratio < 0.95 {
        ("slightly tall", "Slightly elongated - moderate sweetness")
    } else if aspect_ratio <= 1.05 {
        ("round", "Excellent round shape - indicates sweetness")
    } else if aspect_ratio <= 1.2 {
        ("slightly wide", "Slightly wide - good sweetness potential")
    } else if aspect_ratio <= 1.4 {
        ("wide/oval", "Wide oval shape - moderate sweetness")
    } else {
        ("very wide", "Very wide shape - may be watery")
    }
}
