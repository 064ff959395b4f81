//! profreport: chart resource usage from a profiler capture.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use profreport::config::{
    ReportConfig, DEFAULT_HEIGHT, DEFAULT_OUTPUT_DIR, DEFAULT_TICK_MINUTES, DEFAULT_WIDTH,
    MAX_TICK_MINUTES,
};
use profreport::output::{BarhType, SvgOutput};

/// Exit status when the input capture does not exist.
const EXIT_INPUT_MISSING: i32 = 99;

#[derive(Debug, Parser)]
#[command(name = "profreport")]
#[command(about = "Chart process and cgroup resource usage from a profiler capture")]
#[command(version, disable_version_flag = true)]
struct Command {
    /// Profiler CSV holding process and cgroup records
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the chart artifacts, created if absent
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Figure width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Minutes between major time axis labels
    #[arg(
        long,
        default_value_t = DEFAULT_TICK_MINUTES,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TICK_MINUTES)
    )]
    tick_interval: i64,

    /// Process state labeling: cpu or plain
    #[arg(long, default_value_t = BarhType::Cpu)]
    barh_type: BarhType,

    /// Print the report summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: (),
}

impl From<&Command> for ReportConfig {
    fn from(opts: &Command) -> Self {
        Self {
            input: opts.input.clone(),
            output_dir: opts.output.clone(),
            width: opts.width,
            height: opts.height,
            tick_interval_minutes: opts.tick_interval,
            barh_type: opts.barh_type,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let opts = Command::parse();
    init_logging(opts.verbose);

    if !opts.input.exists() {
        error!("Input file {} does not exist", opts.input.display());
        process::exit(EXIT_INPUT_MISSING);
    }

    let config = ReportConfig::from(&opts);
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let mut output = SvgOutput::new(config.width, config.height)
        .with_tick_interval(config.tick_interval_minutes);
    let summary = profreport::generate(&config, &mut output)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            "Wrote {} charts to {}",
            summary.artifacts.len(),
            config.output_dir.display()
        );
    }

    Ok(())
}
