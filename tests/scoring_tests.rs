//! End-to-end scoring tests on synthetic photos
//!
//! The images are built with `image::RgbaImage` so the tests exercise the same
//! buffer layout a decoded photo would have.

use image::{Rgba, RgbaImage};
use melon_score::aggregate::{EffectiveWeights, confidence};
use melon_score::config::{AggregateConfig, AnalyzerConfig, SamplerConfig, WeightConfig};
use melon_score::detector::ContourLocator;
use melon_score::features::{Heuristic, ShapeRatio, StemColor};
use melon_score::models::{Contour, Feature, ImageBuffer, Region};
use melon_score::utils::sampler::{SamplingDensity, dominant_colors};
use melon_score::{AnalysisError, Analyzer, analyze, analyze_rgba};
use serde_json::{Value, json};

const BACKDROP: Rgba<u8> = Rgba([235, 235, 235, 255]);
const RIND: Rgba<u8> = Rgba([60, 120, 60, 255]);
const FIELD_SPOT: Rgba<u8> = Rgba([230, 200, 60, 255]);

/// 200x200 light backdrop with a square melon from 40 to 160, yellow from row 95 down
fn melon_with_field_spot() -> RgbaImage {
    RgbaImage::from_fn(200, 200, |x, y| {
        if !(40..160).contains(&x) || !(40..160).contains(&y) {
            BACKDROP
        } else if y >= 95 {
            FIELD_SPOT
        } else {
            RIND
        }
    })
}

/// Deterministic noise so the range checks see varied colour statistics
fn noisy(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut state = seed;
    RgbaImage::from_fn(width, height, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let bytes = (state >> 16).to_le_bytes();
        Rgba([bytes[0], bytes[1], bytes[2], 255])
    })
}

fn box_contour(width: i64, height: i64) -> Contour {
    let bbox = Region::new(0, 0, width, height);
    Contour {
        bounding_box: bbox,
        center: bbox.center(),
        area: (width * height).max(0) as usize,
    }
}

#[test]
fn scores_stay_in_range_for_varied_images() {
    let images = vec![
        noisy(64, 48, 1),
        noisy(17, 91, 7),
        noisy(3, 3, 42),
        RgbaImage::from_pixel(1, 1, RIND),
        RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255])),
        melon_with_field_spot(),
    ];
    for img in &images {
        let buffer = ImageBuffer::from_image(img).unwrap();
        let result = analyze(&buffer).unwrap();
        assert!(result.overall_score <= 100);
        assert!((0.5..=1.0).contains(&result.confidence));
        for feature in Feature::ALL {
            assert!(result.feature(feature).score <= 100, "{:?}", feature);
        }
    }
}

#[test]
fn uniform_image_has_single_dominant_color() {
    let img = RgbaImage::from_pixel(80, 60, RIND);
    let buffer = ImageBuffer::from_image(&img).unwrap();
    let colors = dominant_colors(&buffer, None, SamplingDensity::Coarse, &SamplerConfig::default());
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].percentage, 100.0);
}

#[test]
fn zero_sized_region_has_no_dominant_colors() {
    let img = RgbaImage::from_pixel(80, 60, RIND);
    let buffer = ImageBuffer::from_image(&img).unwrap();
    let config = SamplerConfig::default();
    for region in [Region::new(10, 10, 0, 20), Region::new(10, 10, 20, 0)] {
        assert!(dominant_colors(&buffer, Some(region), SamplingDensity::Fine, &config).is_empty());
    }
}

#[test]
fn elongation_never_beats_a_square() {
    let img = RgbaImage::from_pixel(4, 4, BACKDROP);
    let buffer = ImageBuffer::from_image(&img).unwrap();
    let config = AnalyzerConfig::default();
    let square = ShapeRatio::analyze(&buffer, &box_contour(120, 120), &config);
    assert_eq!(square.details["shapeType"], json!("round"));
    for (w, h) in [(121, 120), (132, 120), (160, 120), (120, 150), (60, 120), (400, 120)] {
        let other = ShapeRatio::analyze(&buffer, &box_contour(w, h), &config);
        assert!(square.score >= other.score, "{}x{}", w, h);
    }
}

#[test]
fn green_stem_is_visible_and_penalized() {
    let img = RgbaImage::from_fn(100, 100, |_, y| {
        if y < 30 { Rgba([50, 170, 40, 255]) } else { RIND }
    });
    let buffer = ImageBuffer::from_image(&img).unwrap();
    let result = StemColor::analyze(&buffer, &box_contour(100, 100), &AnalyzerConfig::default());
    assert_eq!(result.stem_visible(), Some(true));
    assert!(result.score < 50, "score {}", result.score);
}

#[test]
fn hidden_stem_weight_is_redistributed() {
    let config = WeightConfig::default();
    let nominal = EffectiveWeights::nominal(&config);
    let redistributed = EffectiveWeights::for_stem_visibility(&config, false);
    assert_eq!(redistributed.stem, 0.0);
    assert!((redistributed.total() - nominal.total()).abs() < 1e-9);
    assert!((redistributed.total() - 100.0).abs() < 1e-9);
}

#[test]
fn confidence_extremes() {
    let config = AggregateConfig::default();
    assert_eq!(confidence(&[42.0; 5], &config), 1.0);
    assert_eq!(confidence(&[0.0, 100.0, 0.0, 100.0, 0.0], &config), 0.5);
}

#[test]
fn all_white_frame_degrades_gracefully() {
    let img = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
    let buffer = ImageBuffer::from_image(&img).unwrap();

    let contour = ContourLocator::locate(&buffer, &AnalyzerConfig::default().contour);
    assert_eq!(contour.bounding_box, Region::new(0, 0, 100, 100));
    assert_eq!(contour.area, 0);

    let result = analyze(&buffer).unwrap();
    assert_eq!(result.shape_ratio.score, 100);
    assert_eq!(result.shape_ratio.details["shapeType"], json!("round"));
    assert!(result.overall_score <= 100);
    assert!(!result.recommendations.is_empty());
}

#[test]
fn yellow_lower_half_reads_as_field_spot() {
    let img = melon_with_field_spot();
    let buffer = ImageBuffer::from_image(&img).unwrap();
    let result = analyze(&buffer).unwrap();
    assert!(result.field_spot_color.score > 60, "score {}", result.field_spot_color.score);
    assert!(result.field_spot_color.error().is_none());
}

#[test]
fn malformed_buffer_is_rejected() {
    let err = analyze_rgba(&[0u8; 15], 2, 2).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidImage { .. }));
    let err = analyze_rgba(&[], 0, 10).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidImage { .. }));
}

#[test]
fn json_output_uses_camel_case() {
    let img = melon_with_field_spot();
    let buffer = ImageBuffer::from_image(&img).unwrap();
    let result = analyze(&buffer).unwrap();
    let value: Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    for key in [
        "overallScore",
        "confidence",
        "fieldSpotColor",
        "stemColor",
        "skinDullness",
        "shapeRatio",
        "webbingDensity",
        "recommendations",
        "analysisTime",
    ] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert!(value["stemColor"]["details"].get("stemVisible").is_some());
}

#[test]
fn parallel_and_sequential_agree() {
    let img = melon_with_field_spot();
    let buffer = ImageBuffer::from_image(&img).unwrap();
    let parallel = Analyzer::new().analyze(&buffer).unwrap();
    let sequential = Analyzer::new().sequential().analyze(&buffer).unwrap();
    assert_eq!(parallel.overall_score, sequential.overall_score);
    assert_eq!(parallel.confidence, sequential.confidence);
    assert_eq!(parallel.recommendations, sequential.recommendations);
    for feature in Feature::ALL {
        assert_eq!(parallel.feature(feature), sequential.feature(feature));
    }
}

#[test]
fn partial_json_config_keeps_defaults() {
    let config = AnalyzerConfig::from_json_str(r#"{ "weights": { "webbing": 20.0 } }"#).unwrap();
    assert_eq!(config.weights.webbing, 20.0);
    assert_eq!(config.weights.field_spot, 30.0);
    assert_eq!(config.contour, AnalyzerConfig::default().contour);
    assert!(Analyzer::with_config(config).is_ok());
}
