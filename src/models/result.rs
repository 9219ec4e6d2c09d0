use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::guard::to_score;

/// Free-form diagnostics attached to a feature result
pub type Details = serde_json::Map<String, Value>;

/// Flatten a `json!` object literal into a [`Details`] map
pub(crate) fn into_details(value: Value) -> Details {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Details::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// The five scored characteristics, in aggregation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    /// Yellow ground spot
    FieldSpotColor,
    /// Dry vs green stem
    StemColor,
    /// Matte vs shiny rind
    SkinDullness,
    /// Roundness
    ShapeRatio,
    /// Brown sugar webbing
    WebbingDensity,
}

impl Feature {
    /// All features in aggregation order
    pub const ALL: [Feature; 5] = [
        Feature::FieldSpotColor,
        Feature::StemColor,
        Feature::SkinDullness,
        Feature::ShapeRatio,
        Feature::WebbingDensity,
    ];

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Feature::FieldSpotColor => "field spot",
            Feature::StemColor => "stem",
            Feature::SkinDullness => "skin dullness",
            Feature::ShapeRatio => "shape",
            Feature::WebbingDensity => "webbing",
        }
    }
}

/// Outcome of one heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureResult {
    /// Integer score in 0..=100
    pub score: u8,
    /// Human readable verdict
    pub description: String,
    /// Heuristic-specific diagnostics, never read by the aggregator except `stemVisible`
    pub details: Details,
}

impl FeatureResult {
    /// Build a result from a raw score; NaN becomes 0, the rest is rounded and clamped
    pub fn new(score: f64, description: impl Into<String>, details: Details) -> Self {
        Self {
            score: to_score(score),
            description: description.into(),
            details,
        }
    }

    /// Default result used when a heuristic cannot run
    pub fn fallback(score: u8, description: impl Into<String>, error: impl Into<String>) -> Self {
        let mut details = Details::new();
        details.insert("error".to_string(), Value::String(error.into()));
        Self {
            score: score.min(100),
            description: description.into(),
            details,
        }
    }

    /// `details.stemVisible`, if the heuristic reported it
    pub fn stem_visible(&self) -> Option<bool> {
        self.details.get("stemVisible").and_then(Value::as_bool)
    }

    /// `details.error`, set on fallback results
    pub fn error(&self) -> Option<&str> {
        self.details.get("error").and_then(Value::as_str)
    }
}

/// Final scoring for one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Weighted score in 0..=100
    pub overall_score: u8,
    /// Agreement between sub-scores, in [0.5, 1.0]
    pub confidence: f64,
    /// Field spot heuristic
    pub field_spot_color: FeatureResult,
    /// Stem heuristic
    pub stem_color: FeatureResult,
    /// Skin dullness heuristic
    pub skin_dullness: FeatureResult,
    /// Shape heuristic
    pub shape_ratio: FeatureResult,
    /// Webbing heuristic
    pub webbing_density: FeatureResult,
    /// Improvement tips followed by one closing remark
    pub recommendations: Vec<String>,
    /// When the analysis finished
    pub analysis_time: DateTime<Utc>,
}

impl AnalysisResult {
    /// Result of a single feature
    pub fn feature(&self, feature: Feature) -> &FeatureResult {
        match feature {
            Feature::FieldSpotColor => &self.field_spot_color,
            Feature::StemColor => &self.stem_color,
            Feature::SkinDullness => &self.skin_dullness,
            Feature::ShapeRatio => &self.shape_ratio,
            Feature::WebbingDensity => &self.webbing_density,
        }
    }

    /// Serialize to the JSON text carried alongside uploaded photos
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_clamps_and_guards_nan() {
        assert_eq!(FeatureResult::new(f64::NAN, "", Details::new()).score, 0);
        assert_eq!(FeatureResult::new(140.2, "", Details::new()).score, 100);
        assert_eq!(FeatureResult::new(-3.0, "", Details::new()).score, 0);
        assert_eq!(FeatureResult::new(64.5, "", Details::new()).score, 65);
    }

    #[test]
    fn test_stem_visible_lookup() {
        let result = FeatureResult::new(65.0, "", into_details(json!({ "stemVisible": false })));
        assert_eq!(result.stem_visible(), Some(false));
        let fallback = FeatureResult::fallback(50, "unavailable", "boom");
        assert_eq!(fallback.stem_visible(), None);
        assert_eq!(fallback.error(), Some("boom"));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let feature = FeatureResult::fallback(50, "x", "y");
        let result = AnalysisResult {
            overall_score: 50,
            confidence: 1.0,
            field_spot_color: feature.clone(),
            stem_color: feature.clone(),
            skin_dullness: feature.clone(),
            shape_ratio: feature.clone(),
            webbing_density: feature,
            recommendations: vec!["tip".to_string()],
            analysis_time: Utc::now(),
        };
        let value: Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(value["overallScore"], json!(50));
        assert!(value.get("webbingDensity").is_some());
        assert!(value.get("analysisTime").is_some());
    }
}
