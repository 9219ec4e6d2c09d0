use tracing::debug;

use crate::config::ContourConfig;
use crate::models::{Contour, ImageBuffer, Point, Region, Rgb};

/// Background-threshold fruit locator
pub struct ContourLocator;

impl ContourLocator {
    /// Locate the fruit's bounding box against a plain backdrop.
    ///
    /// Sparse-samples the frame and treats near-white and near-black pixels
    /// as background. This is a coarse extent estimate, not a segmentation;
    /// when nothing but background is found the whole frame is returned with
    /// `area == 0`.
    pub fn locate(image: &ImageBuffer, config: &ContourConfig) -> Contour {
        let width = image.width();
        let height = image.height();
        let stride = config.stride.max(1);

        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0usize;
        let mut max_y = 0usize;
        let mut sum_x = 0.0f64;
        let mut sum_y = 0.0f64;
        let mut count = 0usize;

        for y in (0..height).step_by(stride) {
            for x in (0..width).step_by(stride) {
                let Some(color) = image.rgb(x, y) else {
                    continue;
                };
                if is_background(color, config) {
                    continue;
                }
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
                sum_x += x as f64;
                sum_y += y as f64;
                count += 1;
            }
        }

        let contour = if count == 0 {
            Contour {
                bounding_box: Region::full(width, height),
                center: Point::new(width as f64 / 2.0, height as f64 / 2.0),
                area: 0,
            }
        } else {
            Contour {
                bounding_box: Region::new(
                    min_x as i64,
                    min_y as i64,
                    (max_x - min_x) as i64,
                    (max_y - min_y) as i64,
                ),
                center: Point::new(sum_x / count as f64, sum_y / count as f64),
                area: count,
            }
        };

        debug!(
            bbox = ?contour.bounding_box,
            area = contour.area,
            "located contour"
        );
        contour
    }
}

#[inline]
fn is_background(c: Rgb, config: &ContourConfig) -> bool {
    let light = config.light_threshold;
    let dark = config.dark_threshold;
    (c.r > light && c.g > light && c.b > light) || (c.r < dark && c.g < dark && c.b < dark)
}
