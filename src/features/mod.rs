//! Ripeness heuristics
//!
//! Each heuristic is a pure function of the image and its contour. Internal
//! detection failures never escape: [`Heuristic::analyze`] turns them into
//! the heuristic's default score with `details.error` set.

use tracing::warn;

use crate::config::AnalyzerConfig;
use crate::error::DetectionError;
use crate::models::{Contour, Feature, FeatureResult, ImageBuffer};

/// Yellow ground-spot coloration
pub mod field_spot;
/// Roundness from the bounding box aspect ratio
pub mod shape;
/// Matte vs glossy rind
pub mod skin_dullness;
/// Brown dry stem vs green stem
pub mod stem;
/// Brown webbing lines and their clusters
pub mod webbing;

pub use field_spot::FieldSpotColor;
pub use shape::ShapeRatio;
pub use skin_dullness::SkinDullness;
pub use stem::StemColor;
pub use webbing::WebbingDensity;

/// A single scoring heuristic
pub trait Heuristic {
    /// Which feature this heuristic scores
    const FEATURE: Feature;

    /// Score reported when the heuristic cannot run
    const FALLBACK_SCORE: u8 = 50;

    /// Measure the feature, or report why it could not be measured
    fn evaluate(
        image: &ImageBuffer,
        contour: &Contour,
        config: &AnalyzerConfig,
    ) -> Result<FeatureResult, DetectionError>;

    /// Description attached to the fallback result
    fn fallback_description(_err: &DetectionError) -> String {
        let label = Self::FEATURE.label();
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => format!(
                "{}{} analysis unavailable",
                first.to_uppercase(),
                chars.as_str()
            ),
            None => "Analysis unavailable".to_string(),
        }
    }

    /// Measure the feature, degrading to the default score on failure
    fn analyze(image: &ImageBuffer, contour: &Contour, config: &AnalyzerConfig) -> FeatureResult {
        match Self::evaluate(image, contour, config) {
            Ok(result) => result,
            Err(err) => {
                warn!(feature = ?Self::FEATURE, error = %err, "heuristic fell back to default score");
                FeatureResult::fallback(
                    Self::FALLBACK_SCORE,
                    Self::fallback_description(&err),
                    err.to_string(),
                )
            }
        }
    }
}
