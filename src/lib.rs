//! melon_score - watermelon ripeness scoring from a single photo
//!
//! Locates the fruit against a light or dark background, scores five visual
//! indicators (field spot, stem, skin dullness, shape, webbing) and combines
//! them into an overall 0-100 score with a confidence value and plain
//! language recommendations.
//!
//! ```no_run
//! let bytes = std::fs::read("melon.jpg").unwrap();
//! let result = melon_score::analyze_encoded(&bytes).unwrap();
//! println!("{} ({:.2})", result.overall_score, result.confidence);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Weighted combination of feature scores
pub mod aggregate;
/// Tunable thresholds, strides and weights
pub mod config;
/// Watermelon localisation
pub mod detector;
/// Error types
pub mod error;
/// The five ripeness heuristics
pub mod features;
/// Core data structures (ImageBuffer, Region, Rgb, AnalysisResult, etc.)
pub mod models;
mod pipeline;
/// Image loading and dataset helpers for the CLI and benches
pub mod tools;
/// Sampling, guard and image metric helpers
pub mod utils;

pub use config::AnalyzerConfig;
pub use error::{AnalysisError, DetectionError, Result};
pub use models::{AnalysisResult, ColorSample, Contour, Feature, FeatureResult, ImageBuffer, Region, Rgb};

use std::path::Path;

/// Analyze an RGBA image with the default configuration
pub fn analyze(image: &ImageBuffer) -> Result<AnalysisResult> {
    Analyzer::new().analyze(image)
}

/// Analyze raw RGBA bytes (4 bytes per pixel, row-major)
///
/// Fails with [`AnalysisError::InvalidImage`] when the buffer length does not
/// match `width * height * 4` or either dimension is zero.
pub fn analyze_rgba(data: &[u8], width: usize, height: usize) -> Result<AnalysisResult> {
    let image = ImageBuffer::from_rgba(data, width, height)?;
    analyze(&image)
}

/// Decode an encoded photo (JPEG, PNG, ...) and analyze it
pub fn analyze_encoded(bytes: &[u8]) -> Result<AnalysisResult> {
    Analyzer::new().analyze_encoded(bytes)
}

/// Reusable analyzer holding a validated configuration
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    parallel: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Analyzer with the default configuration, running heuristics in parallel
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            parallel: true,
        }
    }

    /// Analyzer with a custom configuration
    pub fn with_config(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            parallel: true,
        })
    }

    /// Run the five heuristics one after another on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a validated RGBA buffer
    pub fn analyze(&self, image: &ImageBuffer) -> Result<AnalysisResult> {
        Ok(pipeline::run(image, &self.config, self.parallel))
    }

    /// Decode an encoded photo and analyze it
    pub fn analyze_encoded(&self, bytes: &[u8]) -> Result<AnalysisResult> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| AnalysisError::decode("unsupported or corrupt image data", e))?
            .to_rgba8();
        let image = ImageBuffer::from_image(&decoded)?;
        self.analyze(&image)
    }

    /// Load a photo from disk and analyze it
    pub fn analyze_path(&self, path: &Path) -> Result<AnalysisResult> {
        let decoded = tools::load_rgba(path)?;
        let image = ImageBuffer::from_image(&decoded)?;
        self.analyze(&image)
    }
}
