//! Tunable constants for the scoring pipeline.
//!
//! Every threshold here is empirical. Defaults reproduce the reference
//! scoring; override them from a JSON file or `MELON_*` environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::models::Rgb;

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
}

fn overlay<T: std::str::FromStr>(slot: &mut T, name: &str) {
    if let Some(value) = parse_env(name) {
        *slot = value;
    }
}

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Foreground bounding-box search
    pub contour: ContourConfig,
    /// Dominant color sampling
    pub sampler: SamplerConfig,
    /// Stem heuristic overrides
    pub stem: StemConfig,
    /// Skin dullness grid
    pub dullness: DullnessConfig,
    /// Webbing detection and clustering
    pub webbing: WebbingConfig,
    /// Feature weights
    pub weights: WeightConfig,
    /// Confidence and recommendations
    pub aggregate: AggregateConfig,
}

/// Contour locator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Sample every n-th pixel on both axes
    pub stride: usize,
    /// All channels above this are background (light backdrop)
    pub light_threshold: u8,
    /// All channels below this are background (shadow)
    pub dark_threshold: u8,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            stride: 3,
            light_threshold: 200,
            dark_threshold: 50,
        }
    }
}

/// Dominant color sampler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Channel quantization step
    pub quantization: u8,
    /// Number of dominant colors returned
    pub top_n: usize,
    /// sqrt(area) divisor for coarse sampling
    pub coarse_divisor: f64,
    /// Minimum coarse stride
    pub coarse_min_stride: usize,
    /// sqrt(area) divisor for fine sampling
    pub fine_divisor: f64,
    /// Minimum fine stride
    pub fine_min_stride: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            quantization: 32,
            top_n: 5,
            coarse_divisor: 50.0,
            coarse_min_stride: 2,
            fine_divisor: 150.0,
            fine_min_stride: 1,
        }
    }
}

/// Stem heuristic parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemConfig {
    /// Score reported when no stem is visible
    pub neutral_score: f64,
    /// Floor applied when the stem is poor but partially visible
    pub partial_floor: f64,
}

impl Default for StemConfig {
    fn default() -> Self {
        Self {
            neutral_score: 65.0,
            partial_floor: 35.0,
        }
    }
}

/// Skin dullness parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DullnessConfig {
    /// Grid stride in pixels
    pub stride: usize,
    /// Fewer samples than this is a detection failure
    pub min_samples: usize,
    /// Window side as a fraction of the smaller bounding-box side
    pub region_fraction: f64,
}

impl Default for DullnessConfig {
    fn default() -> Self {
        Self {
            stride: 8,
            min_samples: 5,
            region_fraction: 0.3,
        }
    }
}

/// Webbing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebbingConfig {
    /// sqrt(area) divisor for the sampling stride
    pub stride_divisor: f64,
    /// Minimum sampling stride
    pub min_stride: usize,
    /// Cluster radius as a multiple of the stride
    pub cluster_radius_factor: f64,
    /// Clusters with fewer members are dropped
    pub min_cluster_size: usize,
    /// Brownness above this counts as webbing
    pub brown_threshold: f64,
    /// Typical rind color contrast is measured against
    pub reference_green: Rgb,
}

impl Default for WebbingConfig {
    fn default() -> Self {
        Self {
            stride_divisor: 60.0,
            min_stride: 2,
            cluster_radius_factor: 3.0,
            min_cluster_size: 3,
            brown_threshold: 15.0,
            reference_green: Rgb::new(80, 120, 60),
        }
    }
}

/// Nominal feature weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
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
    /// Share of the stem weight moved to field spot when no stem is visible
    pub stem_to_field_spot: f64,
    /// Share of the stem weight moved to dullness when no stem is visible
    pub stem_to_dullness: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            field_spot: 30.0,
            stem: 25.0,
            dullness: 25.0,
            shape: 10.0,
            webbing: 10.0,
            stem_to_field_spot: 0.6,
            stem_to_dullness: 0.4,
        }
    }
}

impl WeightConfig {
    /// Sum of the five nominal weights
    pub fn total(&self) -> f64 {
        self.field_spot + self.stem + self.dullness + self.shape + self.webbing
    }
}

/// Aggregation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Variance is divided by this before being subtracted from 1
    pub confidence_divisor: f64,
    /// Lowest confidence ever reported
    pub confidence_floor: f64,
    /// Sub-scores below this earn an improvement tip
    pub recommendation_threshold: u8,
    /// Overall score for the "excellent" closing remark
    pub excellent_score: u8,
    /// Overall score for the "good" closing remark
    pub good_score: u8,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            confidence_divisor: 1000.0,
            confidence_floor: 0.5,
            recommendation_threshold: 60,
            excellent_score: 80,
            good_score: 60,
        }
    }
}

impl AnalyzerConfig {
    /// Load from a JSON file; missing sections keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_json_str(&text)
    }

    /// Parse from JSON text and validate
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with any parsable `MELON_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `MELON_*` environment variables; unparsable values are ignored
    pub fn apply_env(&mut self) {
        overlay(&mut self.contour.stride, "MELON_CONTOUR_STRIDE");
        overlay(&mut self.sampler.top_n, "MELON_SAMPLER_TOP_N");
        overlay(&mut self.sampler.quantization, "MELON_SAMPLER_QUANTIZATION");
        overlay(&mut self.stem.neutral_score, "MELON_STEM_NEUTRAL_SCORE");
        overlay(&mut self.dullness.stride, "MELON_DULLNESS_STRIDE");
        overlay(&mut self.webbing.brown_threshold, "MELON_WEBBING_BROWN_THRESHOLD");
        overlay(&mut self.weights.field_spot, "MELON_WEIGHT_FIELD_SPOT");
        overlay(&mut self.weights.stem, "MELON_WEIGHT_STEM");
        overlay(&mut self.weights.dullness, "MELON_WEIGHT_DULLNESS");
        overlay(&mut self.weights.shape, "MELON_WEIGHT_SHAPE");
        overlay(&mut self.weights.webbing, "MELON_WEIGHT_WEBBING");
        overlay(
            &mut self.aggregate.confidence_divisor,
            "MELON_CONFIDENCE_DIVISOR",
        );
    }

    /// Reject configurations that would make the pipeline divide by zero
    pub fn validate(&self) -> Result<()> {
        let weights = [
            self.weights.field_spot,
            self.weights.stem,
            self.weights.dullness,
            self.weights.shape,
            self.weights.webbing,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::Config {
                message: "feature weights must be finite and non-negative".to_string(),
            });
        }
        if self.weights.total() <= 0.0 {
            return Err(AnalysisError::Config {
                message: "feature weights must sum to a positive value".to_string(),
            });
        }
        let shares = [self.weights.stem_to_field_spot, self.weights.stem_to_dullness];
        if shares.iter().any(|s| !s.is_finite() || *s < 0.0)
            || (shares[0] + shares[1] - 1.0).abs() > 1e-9
        {
            return Err(AnalysisError::Config {
                message: "stem weight shares must be non-negative and sum to 1".to_string(),
            });
        }
        if self.contour.stride == 0 || self.dullness.stride == 0 {
            return Err(AnalysisError::Config {
                message: "sampling strides must be at least 1".to_string(),
            });
        }
        if self.sampler.quantization == 0 || self.sampler.top_n == 0 {
            return Err(AnalysisError::Config {
                message: "sampler quantization and top_n must be at least 1".to_string(),
            });
        }
        if self.aggregate.confidence_divisor <= 0.0 {
            return Err(AnalysisError::Config {
                message: "confidence divisor must be positive".to_string(),
            });
        }
        Ok(())
    }
}
