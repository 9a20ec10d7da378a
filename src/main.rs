//! Binary entrypoint for photo-collage.
//!
//! Reads a YAML configuration (CLI flags override it), then builds one collage
//! per batch of unused images in the image directory.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use photo_collage::config::Configuration;

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "photo-collage", about = "Grid-template photo collage generator")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Style name (overrides config)
    #[arg(short, long)]
    style: Option<String>,

    /// Base seed for reproducible layouts and rotations
    #[arg(long)]
    seed: Option<u64>,

    /// Directory of source images (overrides config)
    #[arg(long, value_name = "DIR")]
    images_dir: Option<PathBuf>,

    /// Directory for rendered collages (overrides config)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("photo_collage={}", level).parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(style) = cli.style {
        cfg.style = style;
    }
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    if let Some(dir) = cli.images_dir {
        cfg.images_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        cfg.output_dir = dir;
    }
    cfg.validate().context("validating configuration")?;

    let outcomes = photo_collage::batch::run(&cfg).await?;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    for outcome in &outcomes {
        if let Ok(written) = &outcome.result {
            info!(
                batch = outcome.index,
                images = outcome.images.len(),
                "created {}",
                written.image.display()
            );
        }
    }
    if failed == outcomes.len() {
        bail!("all {failed} collages failed");
    }
    Ok(())
}
