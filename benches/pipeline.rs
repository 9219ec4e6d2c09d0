use criterion::{Criterion, black_box, criterion_group, criterion_main};
use melon_score::config::SamplerConfig;
use melon_score::models::ImageBuffer;
use melon_score::utils::sampler::{SamplingDensity, dominant_colors};
use melon_score::{Analyzer, analyze};

/// Synthetic melon on a light backdrop: green rind with brown lines, yellow lower band
fn melon_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 4);
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let (rx, ry) = (width as f64 * 0.4, height as f64 * 0.4);
    for y in 0..height {
        for x in 0..width {
            let dx = (x as f64 - cx) / rx;
            let dy = (y as f64 - cy) / ry;
            let c = if dx * dx + dy * dy > 1.0 {
                [240, 240, 240]
            } else if dy > 0.6 {
                [225, 195, 70]
            } else if x % 23 < 2 || y % 31 < 2 {
                [125, 80, 45]
            } else {
                [60, 110, 55]
            };
            data.extend_from_slice(&[c[0], c[1], c[2], 255]);
        }
    }
    data
}

fn bench_analyze_medium(c: &mut Criterion) {
    let data = melon_image(640, 480);
    c.bench_function("analyze_640x480", |b| {
        b.iter(|| {
            let image = ImageBuffer::from_rgba(black_box(&data), 640, 480).unwrap();
            analyze(&image).unwrap()
        })
    });
}

fn bench_analyze_large(c: &mut Criterion) {
    let data = melon_image(1920, 1080);
    c.bench_function("analyze_1920x1080", |b| {
        b.iter(|| {
            let image = ImageBuffer::from_rgba(black_box(&data), 1920, 1080).unwrap();
            analyze(&image).unwrap()
        })
    });
}

fn bench_analyze_large_sequential(c: &mut Criterion) {
    let data = melon_image(1920, 1080);
    let analyzer = Analyzer::new().sequential();
    c.bench_function("analyze_sequential_1920x1080", |b| {
        b.iter(|| {
            let image = ImageBuffer::from_rgba(black_box(&data), 1920, 1080).unwrap();
            analyzer.analyze(&image).unwrap()
        })
    });
}

fn bench_dominant_colors(c: &mut Criterion) {
    let data = melon_image(1920, 1080);
    let image = ImageBuffer::from_rgba(&data, 1920, 1080).unwrap();
    let config = SamplerConfig::default();
    c.bench_function("dominant_colors_fine_1920x1080", |b| {
        b.iter(|| dominant_colors(black_box(&image), None, SamplingDensity::Fine, &config))
    });
}

criterion_group!(
    benches,
    bench_analyze_medium,
    bench_analyze_large,
    bench_analyze_large_sequential,
    bench_dominant_colors
);
criterion_main!(benches);
