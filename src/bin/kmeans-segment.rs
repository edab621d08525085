//! Command-line interface for kmeans-segment
//!
//! Usage: kmeans-segment [OPTIONS] <INPUT> <OUTPUT>

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use kmeans_segment::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "kmeans-segment", version, about = "K-means color segmentation")]
struct Cli {
    /// Input image path
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output image path
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Number of clusters
    #[arg(short = 'k', long = "centroids", default_value_t = 8)]
    centroids: usize,

    /// Maximum assign/update iterations
    #[arg(short = 'i', long = "max-iterations", default_value_t = 30)]
    max_iterations: usize,

    /// serial, worker-pool or task-parallel
    #[arg(short = 'm', long = "mode", default_value = "serial")]
    mode: ExecutionMode,

    /// Worker threads for parallel modes (default: available cores)
    #[arg(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Segment the luminance channel only
    #[arg(long = "gray", action = ArgAction::SetTrue)]
    gray: bool,

    /// Reseed empty clusters from random pixels instead of keeping them
    #[arg(long = "reseed-empty", action = ArgAction::SetTrue)]
    reseed_empty: bool,

    /// Fixed seed for centroid sampling
    #[arg(long = "seed")]
    seed: Option<u64>,
}

fn build_config(cli: &Cli) -> SegmentConfig {
    let channels = if cli.gray { Channels::Gray } else { Channels::Rgb };
    let mut cfg = SegmentConfig::new()
        .channels(channels)
        .centroid_count(cli.centroids)
        .max_iterations(cli.max_iterations)
        .execution_mode(cli.mode);
    if let Some(t) = cli.threads { cfg = cfg.worker_count(t); }
    if cli.reseed_empty { cfg = cfg.empty_cluster_policy(EmptyClusterPolicy::Reseed); }
    if let Some(s) = cli.seed { cfg = cfg.seed(s); }
    cfg
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = build_config(&cli);
    let channels = config.validate()?;

    println!("Loading {}...", cli.input.display());
    let img = image::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    let mut grid = PixelGrid::from_dynamic(&img, channels);

    println!(
        "Segmenting {}x{} {} image into {} clusters ({})",
        grid.width(), grid.height(), channels, config.centroid_count, config.execution_mode
    );

    let mut engine = SegmentationEngine::new(config)?;
    let start = std::time::Instant::now();
    let result = engine.process(&mut grid)?;
    let elapsed = start.elapsed();

    println!("Finished in {} iterations ({:?})", result.iterations, elapsed);
    if !result.converged {
        println!("Iteration cap reached before convergence");
    }

    grid.to_dynamic()?
        .save(&cli.output)
        .with_context(|| format!("failed to save {}", cli.output.display()))?;
    println!("Saved to {}", cli.output.display());
    Ok(())
}
