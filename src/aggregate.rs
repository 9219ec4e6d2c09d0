//! Combining the five feature results into one verdict.
//!
//! Weights start from the configured nominal values. A stem that was not
//! visible in the photo gives up its weight to the field spot and dullness
//! features, so an unphotographed stem neither helps nor hurts the score.

use tracing::debug;

use crate::config::{AggregateConfig, AnalyzerConfig, WeightConfig};
use crate::models::{Feature, FeatureResult};
use crate::utils::guard::{safe_divide, safe_score};

/// The five heuristic outcomes of one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureResults {
    /// Field spot result
    pub field_spot: FeatureResult,
    /// Stem result
    pub stem: FeatureResult,
    /// Skin dullness result
    pub dullness: FeatureResult,
    /// Shape result
    pub shape: FeatureResult,
    /// Webbing result
    pub webbing: FeatureResult,
}

impl FeatureResults {
    /// Result for one feature
    pub fn get(&self, feature: Feature) -> &FeatureResult {
        match feature {
            Feature::FieldSpotColor => &self.field_spot,
            Feature::StemColor => &self.stem,
            Feature::SkinDullness => &self.dullness,
            Feature::ShapeRatio => &self.shape,
            Feature::WebbingDensity => &self.webbing,
        }
    }

    /// Scores in [`Feature::ALL`] order
    pub fn scores(&self) -> [f64; 5] {
        Feature::ALL.map(|f| self.get(f).score as f64)
    }

    /// False only when the stem heuristic explicitly reported no stem
    pub fn stem_visible(&self) -> bool {
        self.stem.stem_visible() != Some(false)
    }
}

/// Weights actually applied to each feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveWeights {
    /// Field spot weight
    pub field_spot: f64,
    /// Stem weight
    pub stem: f64,
    /// Skin dullness weight
    pub dullness: f64,
    /// Shape weight
    pub shape: f64,
    /// Webbing weight
    pub webbing: f64,
}

impl EffectiveWeights {
    /// The configured weights, unmodified
    pub fn nominal(config: &WeightConfig) -> Self {
        Self {
            field_spot: config.field_spot,
            stem: config.stem,
            dullness: config.dullness,
            shape: config.shape,
            webbing: config.webbing,
        }
    }

    /// Nominal weights, with the stem share moved elsewhere when it was not seen
    pub fn for_stem_visibility(config: &WeightConfig, stem_visible: bool) -> Self {
        let mut weights = Self::nominal(config);
        if !stem_visible {
            let stem = weights.stem;
            weights.stem = 0.0;
            weights.field_spot += stem * config.stem_to_field_spot;
            weights.dullness += stem * config.stem_to_dullness;
        }
        weights
    }

    /// Weight of one feature
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::FieldSpotColor => self.field_spot,
            Feature::StemColor => self.stem,
            Feature::SkinDullness => self.dullness,
            Feature::ShapeRatio => self.shape,
            Feature::WebbingDensity => self.webbing,
        }
    }

    /// Sum of all five weights
    pub fn total(&self) -> f64 {
        Feature::ALL.iter().map(|&f| self.get(f)).sum()
    }
}

/// Aggregated verdict, before it is packaged as an `AnalysisResult`
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Weighted score, 0-100
    pub overall_score: u8,
    /// Sub-score agreement, floor..=1
    pub confidence: f64,
    /// Tips plus one closing remark
    pub recommendations: Vec<String>,
    /// Weights that produced `overall_score`
    pub weights: EffectiveWeights,
}

/// Weighted mean of `scores` (in [`Feature::ALL`] order); NaN counts as 0
pub fn overall_score(scores: &[f64; 5], weights: &EffectiveWeights) -> u8 {
    let weighted: f64 = Feature::ALL
        .iter()
        .zip(scores.iter())
        .map(|(&feature, &score)| safe_score(score) * weights.get(feature))
        .sum();
    safe_divide(weighted, weights.total()).round().clamp(0.0, 100.0) as u8
}

/// `max(floor, 1 - variance / divisor)`, capped at 1; NaN scores count as 0
pub fn confidence(scores: &[f64], config: &AggregateConfig) -> f64 {
    if scores.is_empty() {
        return 1.0;
    }
    let n = scores.len() as f64;
    let mean = scores.iter().map(|&s| safe_score(s)).sum::<f64>() / n;
    let variance = scores
        .iter()
        .map(|&s| (safe_score(s) - mean).powi(2))
        .sum::<f64>()
        / n;
    (1.0 - safe_divide(variance, config.confidence_divisor))
        .max(config.confidence_floor)
        .min(1.0)
}

/// Improvement tips for weak features, then a closing remark
pub fn recommendations(
    results: &FeatureResults,
    overall_score: u8,
    config: &AggregateConfig,
) -> Vec<String> {
    let threshold = config.recommendation_threshold;
    let mut tips = Vec::new();

    if results.field_spot.score < threshold {
        tips.push("Look for a more pronounced yellow field spot for better sweetness");
    }
    if !results.stem_visible() {
        tips.push("Stem not visible in image - other quality indicators evaluated");
    } else if results.stem.score < threshold {
        tips.push("Choose watermelons with brown, dry stems indicating vine ripeness");
    }
    if results.dullness.score < threshold {
        tips.push("Select melons with duller skin rather than shiny appearance");
    }
    if results.shape.score < threshold {
        tips.push("Rounder watermelons tend to be sweeter than elongated ones");
    }
    if results.webbing.score < threshold {
        tips.push("Look for more pronounced webbing patterns on the skin");
    }

    tips.push(if overall_score >= config.excellent_score {
        "This watermelon shows excellent quality indicators!"
    } else if overall_score >= config.good_score {
        "This watermelon shows good quality with room for improvement"
    } else {
        "Consider looking for a different watermelon with better quality indicators"
    });

    tips.into_iter().map(String::from).collect()
}

/// Turns five feature results into the overall verdict
pub struct Aggregator;

impl Aggregator {
    /// Weight, score and annotate a complete set of feature results
    pub fn combine(results: &FeatureResults, config: &AnalyzerConfig) -> Aggregate {
        let weights = EffectiveWeights::for_stem_visibility(&config.weights, results.stem_visible());
        let scores = results.scores();
        let overall_score = overall_score(&scores, &weights);
        let confidence = confidence(&scores, &config.aggregate);
        let recommendations = recommendations(results, overall_score, &config.aggregate);

        debug!(?weights, overall_score, confidence, "aggregated");

        Aggregate {
            overall_score,
            confidence,
            recommendations,
            weights,
        }
    }
}
