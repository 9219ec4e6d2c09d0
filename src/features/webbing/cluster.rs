//! Spatial grouping of brown webbing samples.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::Serialize;

use crate::models::Point;
use crate::utils::guard::{round_to, safe_divide};

/// A sampled pixel classified as brown webbing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrownPixel {
    /// Pixel position
    pub position: Point,
    /// Heuristic brownness, 0-100
    pub brownness: f64,
    /// RGB distance from the reference rind green
    pub contrast: f64,
}

/// Brown pixels keyed by `(y, x)` so iteration follows scan order
pub type BrownPixelMap = BTreeMap<(i64, i64), BrownPixel>;

/// Group of nearby brown pixels, built and discarded within one evaluation
#[derive(Debug, Clone)]
pub struct WebbingCluster {
    /// Running centroid of the members
    pub center: Point,
    /// Member pixels in absorption order
    pub pixels: Vec<BrownPixel>,
    /// Sum of member brownness
    pub total_brownness: f64,
    /// Sum of member contrast
    pub total_contrast: f64,
    sum_x: f64,
    sum_y: f64,
}

/// Per-cluster diagnostics and score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterScore {
    /// Cluster score, 0-100
    pub score: f64,
    /// Mean member brownness
    pub avg_brownness: f64,
    /// Mean member contrast
    pub avg_contrast: f64,
    /// Mean member distance from the centroid
    pub avg_line_width: f64,
    /// Largest member distance from the centroid
    pub max_line_width: f64,
    /// Members per unit of enclosing circle area
    pub density: f64,
}

impl WebbingCluster {
    fn seed(pixel: BrownPixel) -> Self {
        Self {
            center: pixel.position,
            pixels: vec![pixel],
            total_brownness: pixel.brownness,
            total_contrast: pixel.contrast,
            sum_x: pixel.position.x,
            sum_y: pixel.position.y,
        }
    }

    fn absorb(&mut self, pixel: BrownPixel) {
        self.pixels.push(pixel);
        self.total_brownness += pixel.brownness;
        self.total_contrast += pixel.contrast;
        self.sum_x += pixel.position.x;
        self.sum_y += pixel.position.y;
        let n = self.pixels.len() as f64;
        self.center = Point::new(self.sum_x / n, self.sum_y / n);
    }

    /// Number of member pixels
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True when the cluster has no members
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Score the cluster on color strength, size and spread
    pub fn analyze(&self) -> ClusterScore {
        let n = self.pixels.len() as f64;
        let avg_brownness = safe_divide(self.total_brownness, n);
        let avg_contrast = safe_divide(self.total_contrast, n);

        let mut dist_sum = 0.0;
        let mut dist_max = 0.0f64;
        for pixel in &self.pixels {
            let d = pixel.position.distance(&self.center);
            dist_sum += d;
            dist_max = dist_max.max(d);
        }
        let avg_line_width = safe_divide(dist_sum, n);
        let density = safe_divide(n, PI * dist_max * dist_max);

        let score = (avg_brownness * 0.6).min(40.0)
            + (avg_contrast * 0.2).min(20.0)
            + (n * 2.0).min(25.0)
            + (avg_line_width * 0.5).min(15.0);

        ClusterScore {
            score: score.min(100.0),
            avg_brownness,
            avg_contrast,
            avg_line_width,
            max_line_width: dist_max,
            density,
        }
    }
}

/// Cluster summary kept in the webbing diagnostics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    /// Cluster centroid
    pub center: Point,
    /// Member count
    pub size: usize,
    /// Cluster score
    pub score: f64,
    /// Mean brownness, rounded
    pub avg_brownness: f64,
    /// Mean line width, one decimal
    pub avg_line_width: f64,
    /// Density, two decimals
    pub density: f64,
}

impl ClusterSummary {
    pub(crate) fn new(cluster: &WebbingCluster, score: &ClusterScore) -> Self {
        Self {
            center: cluster.center,
            size: cluster.len(),
            score: score.score,
            avg_brownness: score.avg_brownness.round(),
            avg_line_width: round_to(score.avg_line_width, 1),
            density: round_to(score.density, 2),
        }
    }
}

/// Greedy centroid clustering.
///
/// Seeds a cluster at each unvisited pixel (scan order) and repeatedly absorbs
/// every unvisited pixel within `radius` of the current centroid, which moves
/// after each absorption, until a pass adds nothing. Clusters smaller than
/// `min_size` are dropped; the rest are sorted by size, largest first.
pub fn find_clusters(pixels: &BrownPixelMap, radius: f64, min_size: usize) -> Vec<WebbingCluster> {
    let pixels: Vec<BrownPixel> = pixels.values().copied().collect();
    let mut visited = vec![false; pixels.len()];
    let radius_sq = radius * radius;
    let mut clusters = Vec::new();

    for seed in 0..pixels.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut cluster = WebbingCluster::seed(pixels[seed]);

        loop {
            let mut grew = false;
            for (idx, pixel) in pixels.iter().enumerate() {
                if visited[idx] {
                    continue;
                }
                if pixel.position.distance_squared(&cluster.center) <= radius_sq {
                    visited[idx] = true;
                    cluster.absorb(*pixel);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }

        if cluster.len() >= min_size {
            clusters.push(cluster);
        }
    }

    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(points: &[(i64, i64)]) -> BrownPixelMap {
        points
            .iter()
            .map(|&(x, y)| {
                (
                    (y, x),
                    BrownPixel {
                        position: Point::new(x as f64, y as f64),
                        brownness: 50.0,
                        contrast: 100.0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_three_close_pixels_form_one_cluster() {
        let clusters = find_clusters(&map(&[(0, 0), (2, 0), (4, 0)]), 6.0, 3);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[0].center, Point::new(2.0, 0.0));
    }

    #[test]
    fn test_small_groups_are_dropped() {
        let clusters = find_clusters(&map(&[(0, 0), (2, 0), (100, 100)]), 6.0, 3);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_clusters_sorted_by_size() {
        let clusters = find_clusters(
            &map(&[(0, 0), (2, 0), (4, 0), (50, 50), (52, 50), (50, 52), (52, 52)]),
            6.0,
            3,
        );
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 4);
        assert_eq!(clusters[1].len(), 3);
    }

    #[test]
    fn test_cluster_score() {
        let clusters = find_clusters(&map(&[(0, 0), (2, 0), (4, 0)]), 6.0, 3);
        let score = clusters[0].analyze();
        assert_eq!(score.avg_brownness, 50.0);
        assert_eq!(score.avg_contrast, 100.0);
        assert_eq!(score.max_line_width, 2.0);
        // 30 + 20 + 6 + (4/3)/2
        assert!((score.score - (56.0 + 2.0 / 3.0)).abs() < 1e-9);
        assert!((score.density - 3.0 / (PI * 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_cluster_density_is_guarded() {
        let mut cluster = WebbingCluster::seed(BrownPixel {
            position: Point::new(1.0, 1.0),
            brownness: 20.0,
            contrast: 0.0,
        });
        cluster.absorb(BrownPixel {
            position: Point::new(1.0, 1.0),
            brownness: 20.0,
            contrast: 0.0,
        });
        assert_eq!(cluster.analyze().density, 0.0);
    }
}
