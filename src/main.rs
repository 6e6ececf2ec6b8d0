use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use volcano_rank::data::loader::load_experiments;
use volcano_rank::report::{render_table, write_report};
use volcano_rank::{RankConfig, rank_compounds};

/// Rank compounds by consensus distance to the volcano-plot extremes.
#[derive(Parser, Debug)]
#[command(name = "volcano-rank", version, about)]
struct Cli {
    /// Experiment tables (.csv, .json, .parquet); every fold-change /
    /// p-value column pair is one comparison.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON run configuration; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drop each compound's most anomalous distance before averaging.
    #[arg(long)]
    remove_outlier: bool,

    /// Number of compounds to report.
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Write the report here (.csv or .json).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = match &cli.config {
        Some(path) => RankConfig::from_json_file(path)?,
        None => RankConfig::default(),
    };
    if cli.remove_outlier {
        config.remove_outlier = true;
    }
    if let Some(k) = cli.top_k {
        config.top_k = k;
    }

    let experiments = load_experiments(&cli.inputs, &config.columns)?;
    info!(
        "loaded {} comparison(s) from {} file(s)",
        experiments.len(),
        cli.inputs.len()
    );

    let report = rank_compounds(&experiments, &config).context("ranking compounds")?;
    print!("{}", render_table(&report));

    if let Some(path) = &cli.output {
        write_report(&report, path)?;
        info!("wrote {}", path.display());
    }
    Ok(())
}
