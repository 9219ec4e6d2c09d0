use chrono::Utc;
use tracing::{debug, info};

use crate::aggregate::{Aggregator, FeatureResults};
use crate::config::AnalyzerConfig;
use crate::detector::ContourLocator;
use crate::features::{
    FieldSpotColor, Heuristic, ShapeRatio, SkinDullness, StemColor, WebbingDensity,
};
use crate::models::{AnalysisResult, Contour, ImageBuffer};

/// Run all five heuristics against one contour.
///
/// The heuristics share nothing mutable, so in parallel mode they are forked
/// with `rayon::join` and this call is the barrier that waits for all five.
pub(crate) fn run_heuristics(
    image: &ImageBuffer,
    contour: &Contour,
    config: &AnalyzerConfig,
    parallel: bool,
) -> FeatureResults {
    if parallel {
        let ((field_spot, stem), ((dullness, shape), webbing)) = rayon::join(
            || {
                rayon::join(
                    || FieldSpotColor::analyze(image, contour, config),
                    || StemColor::analyze(image, contour, config),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || SkinDullness::analyze(image, contour, config),
                            || ShapeRatio::analyze(image, contour, config),
                        )
                    },
                    || WebbingDensity::analyze(image, contour, config),
                )
            },
        );
        FeatureResults {
            field_spot,
            stem,
            dullness,
            shape,
            webbing,
        }
    } else {
        FeatureResults {
            field_spot: FieldSpotColor::analyze(image, contour, config),
            stem: StemColor::analyze(image, contour, config),
            dullness: SkinDullness::analyze(image, contour, config),
            shape: ShapeRatio::analyze(image, contour, config),
            webbing: WebbingDensity::analyze(image, contour, config),
        }
    }
}

/// Locate, score and aggregate one image
pub(crate) fn run(image: &ImageBuffer, config: &AnalyzerConfig, parallel: bool) -> AnalysisResult {
    debug!(
        width = image.width(),
        height = image.height(),
        parallel,
        "starting analysis"
    );

    let contour = ContourLocator::locate(image, &config.contour);
    let features = run_heuristics(image, &contour, config, parallel);
    let aggregate = Aggregator::combine(&features, config);

    info!(
        overall_score = aggregate.overall_score,
        confidence = aggregate.confidence,
        "analysis complete"
    );

    let FeatureResults {
        field_spot,
        stem,
        dullness,
        shape,
        webbing,
    } = features;

    AnalysisResult {
        overall_score: aggregate.overall_score,
        confidence: aggregate.confidence,
        field_spot_color: field_spot,
        stem_color: stem,
        skin_dullness: dullness,
        shape_ratio: shape,
        webbing_density: webbing,
        recommendations: aggregate.recommendations,
        analysis_time: Utc::now(),
    }
}
