//! Subject localisation
//!
//! Finds where the fruit sits in the frame so the heuristics know which
//! rectangles to sample.

/// Bounding box and centroid from background thresholding
pub mod contour;

pub use contour::ContourLocator;
