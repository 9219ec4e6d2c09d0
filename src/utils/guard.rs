//! Shared numeric and region guards.
//!
//! Every heuristic clips its search rectangle and divides by sample counts;
//! these helpers keep the zero and NaN handling identical everywhere.

use crate::error::DetectionError;
use crate::models::{ImageBuffer, Region};

/// `num / den`, or 0 when the quotient would be infinite or NaN
#[inline]
pub fn safe_divide(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let q = num / den;
    if q.is_finite() { q } else { 0.0 }
}

/// Map NaN and infinities to 0
#[inline]
pub fn safe_score(score: f64) -> f64 {
    if score.is_finite() { score } else { 0.0 }
}

/// Clamp to `[lo, hi]`, mapping NaN to `lo`
#[inline]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

/// Round a raw score to an integer in 0..=100
#[inline]
pub fn to_score(score: f64) -> u8 {
    clamp(safe_score(score), 0.0, 100.0).round() as u8
}

/// Clip a search rectangle to the image, failing if nothing is left
pub fn clamp_region(region: Region, image: &ImageBuffer) -> Result<Region, DetectionError> {
    region
        .clamp_to(image.width(), image.height())
        .ok_or(DetectionError::InvalidRegion)
}

/// Round to `digits` decimal places for diagnostics
#[inline]
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (safe_score(value) * factor).round() / factor
}
