//! Utility functions for pixel analysis
//!
//! This module provides the helpers every heuristic shares:
//! - Guards (region clipping, NaN-safe division and score clamping)
//! - Dominant color sampling (quantized buckets ranked by frequency)
//! - Diagnostics (channel histograms, brightness/contrast)

/// Region clipping and NaN-safe arithmetic
pub mod guard;
/// Histograms and brightness/contrast
pub mod metrics;
/// Dominant color sampling
pub mod sampler;
