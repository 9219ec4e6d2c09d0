use clap::{Parser, Subcommand};
use melon_score::config::AnalyzerConfig;
use melon_score::detector::ContourLocator;
use melon_score::models::{Feature, ImageBuffer};
use melon_score::tools::{batch_limit_from_env, dataset_iter, dataset_root_from_env, load_rgba};
use melon_score::utils::metrics::{color_histogram, image_metrics};
use melon_score::utils::sampler::{SamplingDensity, dominant_colors};
use melon_score::{AnalysisError, Analyzer};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{Level, error};

#[derive(Parser)]
#[command(name = "melontool", version, about = "Watermelon ripeness scoring tools")]
struct Cli {
    /// Log pipeline internals at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a single photo and print the result as JSON
    Analyze {
        #[arg(long)]
        image: PathBuf,
        /// JSON configuration file; defaults plus MELON_* overrides otherwise
        #[arg(long)]
        config: Option<PathBuf>,
        /// Run the heuristics on the calling thread
        #[arg(long)]
        sequential: bool,
        /// Print compact single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print contour, dominant colors and brightness metrics for a photo
    Inspect {
        #[arg(long)]
        image: PathBuf,
    },
    /// Score every photo under a directory and print a summary line per image
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the effective configuration as JSON
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Command::Analyze {
            image,
            config,
            sequential,
            compact,
        } => analyze_cmd(&image, config.as_deref(), sequential, compact),
        Command::Inspect { image } => inspect_cmd(&image),
        Command::Batch { root, limit } => batch_cmd(root, limit),
        Command::Config { config } => config_cmd(config.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "melontool failed");
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, AnalysisError> {
    match path {
        Some(path) => AnalyzerConfig::from_json_file(path),
        None => {
            let config = AnalyzerConfig::from_env();
            config.validate()?;
            Ok(config)
        }
    }
}

fn analyze_cmd(
    image: &Path,
    config: Option<&Path>,
    sequential: bool,
    compact: bool,
) -> Result<(), AnalysisError> {
    let mut analyzer = Analyzer::with_config(load_config(config)?)?;
    if sequential {
        analyzer = analyzer.sequential();
    }
    let result = analyzer.analyze_path(image)?;
    let json = if compact {
        result.to_json()?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{}", json);
    Ok(())
}

fn inspect_cmd(path: &Path) -> Result<(), AnalysisError> {
    let config = AnalyzerConfig::from_env();
    let rgba = load_rgba(path)?;
    let image = ImageBuffer::from_image(&rgba)?;

    println!("Image: {} ({}x{})", path.display(), image.width(), image.height());

    let contour = ContourLocator::locate(&image, &config.contour);
    let bbox = contour.bounding_box;
    println!(
        "Contour: x={} y={} w={} h={} center=({:.1}, {:.1}) area={}",
        bbox.x, bbox.y, bbox.width, bbox.height, contour.center.x, contour.center.y, contour.area
    );

    let metrics = image_metrics(&image);
    println!(
        "Brightness: {:.1} (norm {:.3})  Contrast: {:.1} (norm {:.3})",
        metrics.brightness,
        metrics.contrast,
        metrics.normalized_brightness,
        metrics.normalized_contrast
    );

    println!("Dominant colors:");
    for sample in dominant_colors(&image, None, SamplingDensity::Coarse, &config.sampler) {
        println!("  {}  {:5.1}%", sample.hex, sample.percentage);
    }

    let histogram = color_histogram(&image, Some(bbox));
    let peak = |bins: &[f64]| {
        bins.iter()
            .enumerate()
            .fold((0usize, 0.0f64), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0
    };
    println!(
        "Fruit histogram peaks: r={} g={} b={} over {} pixels",
        peak(&histogram.red),
        peak(&histogram.green),
        peak(&histogram.blue),
        histogram.pixel_count
    );
    Ok(())
}

fn batch_cmd(root: Option<PathBuf>, limit: Option<usize>) -> Result<(), AnalysisError> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(batch_limit_from_env);
    let analyzer = Analyzer::with_config(load_config(None)?)?;

    let mut scored = 0usize;
    let mut failed = 0usize;
    let mut total_score = 0u64;
    let start = Instant::now();

    for path in dataset_iter(&root, limit) {
        match analyzer.analyze_path(&path) {
            Ok(result) => {
                scored += 1;
                total_score += result.overall_score as u64;
                let features: Vec<String> = Feature::ALL
                    .iter()
                    .map(|&f| format!("{}={}", f.label(), result.feature(f).score))
                    .collect();
                println!(
                    "{}: {} (confidence {:.2}) [{}]",
                    path.display(),
                    result.overall_score,
                    result.confidence,
                    features.join(", ")
                );
            }
            Err(err) => {
                failed += 1;
                error!(path = %path.display(), error = %err, "skipping image");
            }
        }
    }

    let elapsed = start.elapsed();
    let mean = if scored == 0 {
        0.0
    } else {
        total_score as f64 / scored as f64
    };
    println!(
        "Scored {} images ({} failed) under {} in {:.2?}, mean score {:.1}",
        scored,
        failed,
        root.display(),
        elapsed,
        mean
    );
    Ok(())
}

fn config_cmd(path: Option<&Path>) -> Result<(), AnalysisError> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
