//! Command-line entry point: analyse a CSV of news articles and write the
//! augmented CSV, charts and Markdown report.

use anyhow::{Context, Result};
use clap::Parser;
use newsstats::config::{AnalysisConfig, load_config};
use newsstats::logger;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (.json or .pkl)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input CSV (overrides config)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Disable chart rendering (overrides config)
    #[arg(long, default_value_t = false)]
    disable_viz: bool,

    /// Log filter, e.g. `info` or `newsstats=debug`
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logger::init(cli.log_file.as_deref(), &cli.log_level)
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;

    let mut config: AnalysisConfig = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(input) = cli.input {
        config.input_path = input;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if cli.disable_viz {
        config.viz.enabled = false;
    }

    if let Some(path) = &cli.config {
        info!("Loaded configuration from {}", path.display());
    }
    info!("Basic Statistics Analysis - News Articles");

    let outcome = newsstats::run(&config)
        .with_context(|| format!("Analysis of {} failed", config.input_path.display()))?;

    info!(
        "Analysed {} articles, {} charts written",
        outcome.article_count,
        outcome.charts.len()
    );
    Ok(())
}
