//! fumen - per-measure note density for TJA charts
//!
//! Subcommands:
//! - `fumen analyze <file>` - Print Don/Ka hits per second for every measure
//! - `fumen config` - Show the effective configuration and where it came from

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fumenconf::FumenConfig;

mod commands;
mod report;
mod telemetry;

#[derive(Parser)]
#[command(name = "fumen")]
#[command(about = "Per-measure note density analysis for TJA charts")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./fumen.toml (`~/` and `$VAR/` are expanded)
    #[arg(long, global = true, env = "FUMEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a chart and print one row per measure
    Analyze(commands::AnalyzeArgs),

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // clap hands the path over unexpanded, e.g. from FUMEN_CONFIG
    let config_path = cli.config.map(|path| match path.to_str() {
        Some(text) => fumenconf::expand_path(text),
        None => path,
    });

    let (config, sources) = FumenConfig::load_with_sources_from(config_path.as_deref())
        .context("Failed to load configuration")?;

    telemetry::init(&config.telemetry.log_level);

    match cli.command {
        Commands::Analyze(args) => commands::analyze(args, &config)?,
        Commands::Config => commands::show_config(&config, &sources)?,
    }

    Ok(())
}
