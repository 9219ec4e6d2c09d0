use serde_json::json;
use tracing::debug;

use super::Heuristic;
use crate::config::{AnalyzerConfig, WebbingConfig};
use crate::error::DetectionError;
use crate::models::result::into_details;
use crate::models::{Contour, Feature, FeatureResult, ImageBuffer, Point, Rgb};
use crate::utils::guard::{clamp, clamp_region, round_to, safe_divide};

/// Brown sample clustering and per-cluster scoring
pub mod cluster;

use cluster::{BrownPixel, BrownPixelMap, ClusterSummary, find_clusters};

/// Clusters kept in the diagnostics
const REPORTED_CLUSTERS: usize = 5;

/// Brown webbing line density and clustering
pub struct WebbingDensity;

impl Heuristic for WebbingDensity {
    const FEATURE: Feature = Feature::WebbingDensity;
    const FALLBACK_SCORE: u8 = 30;

    /// Brown line density over the central 80% of the bounding box.
    fn evaluate(
        image: &ImageBuffer,
        contour: &Contour,
        config: &AnalyzerConfig,
    ) -> Result<FeatureResult, DetectionError> {
        let cfg = &config.webbing;
        let search = contour.bounding_box.sub_region(0.1, 0.1, 0.8, 0.8);
        let search = clamp_region(search, image)?;

        let area = search.area() as f64;
        let stride = ((area.sqrt() / cfg.stride_divisor).floor() as usize)
            .max(cfg.min_stride)
            .max(1);

        let mut sample_count = 0usize;
        let mut brown_pixels = BrownPixelMap::new();
        for y in (search.y..search.y + search.height).step_by(stride) {
            for x in (search.x..search.x + search.width).step_by(stride) {
                let Some(color) = image.rgb_at(x, y) else {
                    continue;
                };
                let sample = detect_brown_webbing(color, cfg);
                if sample.is_brown {
                    brown_pixels.insert(
                        (y, x),
                        BrownPixel {
                            position: Point::new(x as f64, y as f64),
                            brownness: sample.brownness,
                            contrast: sample.contrast,
                        },
                    );
                }
                sample_count += 1;
            }
        }

        let radius = stride as f64 * cfg.cluster_radius_factor;
        let clusters = find_clusters(&brown_pixels, radius, cfg.min_cluster_size);

        let mut max_cluster_score = 0.0f64;
        let mut summaries = Vec::with_capacity(clusters.len().min(REPORTED_CLUSTERS));
        for cluster in &clusters {
            let scored = cluster.analyze();
            max_cluster_score = max_cluster_score.max(scored.score);
            if summaries.len() < REPORTED_CLUSTERS {
                summaries.push(ClusterSummary::new(cluster, &scored));
            }
        }

        let brown_count = brown_pixels.len();
        let brown_ratio = safe_divide(brown_count as f64, sample_count as f64);
        // clusters per 100x100 pixels
        let cluster_density = safe_divide(clusters.len() as f64, area / 10_000.0);

        let base_score = (brown_ratio * 300.0).min(60.0);
        let cluster_bonus = if clusters.is_empty() {
            0.0
        } else {
            (max_cluster_score * 0.6 + cluster_density * 20.0).min(40.0)
        };
        let distribution_bonus = if clusters.len() >= 2 {
            (clusters.len() as f64 * 5.0).min(20.0)
        } else {
            0.0
        };
        let score = clamp((base_score + cluster_bonus + distribution_bonus).round(), 0.0, 100.0);

        debug!(
            score,
            stride,
            samples = sample_count,
            brown = brown_count,
            clusters = clusters.len(),
            "webbing"
        );

        let details = into_details(json!({
            "brownPixelRatio": round_to(brown_ratio, 3),
            "brownLinePixels": brown_count,
            "totalClusters": clusters.len(),
            "clusterDensity": round_to(cluster_density, 2),
            "maxClusterScore": max_cluster_score.round(),
            "baseScore": base_score.round(),
            "clusterBonus": cluster_bonus.round(),
            "distributionBonus": distribution_bonus.round(),
            "webbingClusters": summaries,
            "sampleCount": sample_count,
            "searchRegion": search,
        }));
        Ok(FeatureResult::new(score, describe(score), details))
    }

    fn fallback_description(err: &DetectionError) -> String {
        match err {
            DetectionError::InvalidRegion => "Unable to analyze webbing - invalid region".to_string(),
            other => format!("Webbing analysis unavailable - {}", other),
        }
    }
}

/// Brownness classification of one pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrownSample {
    /// Above the configured threshold
    pub is_brown: bool,
    /// Heuristic brownness, 0-100
    pub brownness: f64,
    /// RGB distance from the reference rind green
    pub contrast: f64,
    /// Channel mean
    pub brightness: f64,
}

/// Classify a pixel as brown webbing, from dark reddish-brown to light tan
pub fn detect_brown_webbing(color: Rgb, config: &WebbingConfig) -> BrownSample {
    let (r, g, b) = color.to_f64();
    let brightness = color.brightness();

    let reddish_brown = r >= g && g >= b && r > b;
    let yellowish_brown = r >= g && r >= b && g > b * 1.2;

    let mut brownness = 0.0;
    if reddish_brown || yellowish_brown {
        if brightness < 120.0 && r > g * 1.1 && r > b * 1.3 {
            brownness = ((r - b) / 2.0 + (r - g) / 4.0).min(100.0);
        } else if brightness < 160.0 && r > g && g > b * 0.8 {
            brownness = ((r - b) / 3.0 + (r - g) / 6.0).min(80.0);
        } else if brightness < 200.0 && r > g * 0.9 && r > b * 1.1 {
            brownness = ((r - b) / 4.0 + (r - g) / 8.0).min(60.0);
        }
    }

    BrownSample {
        is_brown: brownness > config.brown_threshold,
        brownness,
        contrast: color.distance(config.reference_green),
        brightness,
    }
}

fn describe(score: f64) -> &'static str {
    if score > 80.0 {
        "Excellent webbing density with concentrated regions - superior pollination"
    } else if score > 65.0 {
        "Very good webbing patterns with clear brown lines"
    } else if score > 45.0 {
        "Good webbing - some brown line patterns detected"
    } else if score > 25.0 {
        "Moderate webbing - limited brown line patterns"
    } else if score > 10.0 {
        "Minimal webbing - few brown lines detected"
    } else {
        "No significant brown webbing patterns detected"
    }
}
