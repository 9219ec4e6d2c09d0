/// RGB colors and dominant color samples
pub mod color;
/// Borrowed RGBA pixel grid
pub mod image_buffer;
/// 2D points
pub mod point;
/// Rectangles and the located contour
pub mod region;
/// Feature and analysis results
pub mod result;

pub use color::{ColorSample, Rgb};
pub use image_buffer::ImageBuffer;
pub use point::Point;
pub use region::{Contour, Region};
pub use result::{AnalysisResult, Details, Feature, FeatureResult};
