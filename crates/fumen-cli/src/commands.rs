//! Subcommand implementations.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use fumen::{AnalysisOptions, SegmentPolicy};
use fumenconf::{ConfigSources, FumenConfig};
use tracing::{debug, info};

use crate::report::{self, OutputFormat, Renderer};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Chart file (.tja)
    pub file: PathBuf,

    /// Output format (default from config, usually table)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Decimal places shown in table output
    #[arg(long)]
    pub precision: Option<u32>,

    /// Initial tempo, replacing the chart's BPM: field
    #[arg(long)]
    pub bpm: Option<f64>,

    /// Signature ratio before the first #MEASURE (4/4 = 1.0)
    #[arg(long)]
    pub signature: Option<f64>,

    /// Fail on unparseable #BPMCHANGE / #MEASURE payloads
    #[arg(long)]
    pub strict: bool,

    /// Count every comma-terminated segment on a line as a measure
    #[arg(long)]
    pub all_segments: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Don't print warnings and notes
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn analyze(args: AnalyzeArgs, config: &FumenConfig) -> Result<()> {
    let options = analysis_options(&args, config)?;
    let format = match args.format {
        Some(format) => format,
        None => OutputFormat::from_config(&config.output.format)?,
    };
    let precision = args.precision.unwrap_or(config.output.precision);
    let color = config.output.color && !args.no_color;

    let bytes = fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    debug!(path = %args.file.display(), bytes = bytes.len(), "read chart");

    let result = fumen::parse(&text, &options)
        .with_context(|| format!("Failed to analyze {}", args.file.display()))?;

    if !args.quiet {
        for item in &result.feedback {
            eprintln!("{}", report::format_feedback(item, color));
        }
    }

    let chart = &result.value;
    info!(
        title = %chart.header.title,
        measures = chart.measures.len(),
        warnings = result.warnings().count(),
        "analysis complete"
    );

    // no ANSI codes in report files
    let renderer = Renderer::new(format, precision, color && args.output.is_none());
    let rendered = renderer.render(chart)?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn analysis_options(args: &AnalyzeArgs, config: &FumenConfig) -> Result<AnalysisOptions> {
    let segments = if args.all_segments {
        SegmentPolicy::All
    } else {
        config
            .analysis
            .segments
            .parse::<SegmentPolicy>()
            .map_err(|e| anyhow!(e))
            .context("Invalid [analysis] segments setting")?
    };

    Ok(AnalysisOptions {
        segments,
        strict: args.strict || config.analysis.strict,
        initial_signature: args.signature.unwrap_or(config.analysis.initial_signature),
        tempo_override: args.bpm,
    })
}

pub fn show_config(config: &FumenConfig, sources: &ConfigSources) -> Result<()> {
    print!("{}", config.to_toml());

    println!();
    if sources.files.is_empty() {
        println!("# sources: compiled defaults only");
    } else {
        for path in &sources.files {
            println!("# file: {}", path.display());
        }
    }
    for var in &sources.env_overrides {
        println!("# env: {}", var);
    }

    Ok(())
}
