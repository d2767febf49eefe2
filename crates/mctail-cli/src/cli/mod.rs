//! CLI entry and startup wiring.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use mctail_core::config::{Config, paths};
use mctail_core::pattern::Pattern;
use mctail_core::pipeline::Pipeline;
use mctail_core::sink::{ColorMode, OutputSink};

use crate::channels;

#[derive(Parser)]
#[command(name = "mctail")]
#[command(version = "0.2")]
#[command(about = "Colorized live viewer for memcache debug fifos")]
#[command(
    long_about = "Search for PATTERN in each debug fifo under the fifo root directory.\n\
        If PATTERN is not provided, every message is shown.\n\
        PATTERN uses Rust regex syntax (https://docs.rs/regex)."
)]
struct Cli {
    /// Pattern matched against the fully rendered message text
    #[arg(value_name = "PATTERN")]
    pattern: Option<String>,

    /// Directory containing the debug fifos
    #[arg(long, short = 'f', value_name = "DIR")]
    fifo_root: Option<PathBuf>,

    /// Only attach to fifos whose file name matches this pattern
    #[arg(long, short = 'P', value_name = "PATTERN")]
    filename_pattern: Option<String>,

    /// Do not display message values
    #[arg(long, short = 'q')]
    quiet: bool,

    /// When to colorize output (auto, always, never)
    #[arg(long, value_name = "WHEN")]
    color: Option<ColorMode>,

    /// Path to the config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let config_path = cli.config.clone().unwrap_or_else(paths::config_path);
    let config = Config::load_from(&config_path).context("load config")?;

    let fifo_root = cli.fifo_root.unwrap_or(config.fifo_root);
    let quiet = cli.quiet || config.quiet;
    let color = cli.color.unwrap_or(config.color);

    // Startup-fatal checks: pattern syntax first, then the fifo root.
    let data_pattern = Pattern::compile(cli.pattern.as_deref().unwrap_or(""))?;
    let filename_pattern = Pattern::compile(cli.filename_pattern.as_deref().unwrap_or(""))?;
    ensure!(
        fifo_root.is_dir(),
        "fifo root {} is not a directory",
        fifo_root.display()
    );

    if let Some(p) = &filename_pattern {
        println!("Filename pattern: {}", p.as_str());
    }
    if let Some(p) = &data_pattern {
        println!("Data pattern: {}", p.as_str());
    }

    let sink = OutputSink::stdout(color);
    let pipeline = Pipeline::new(sink, data_pattern, quiet);

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(channels::watch(&fifo_root, filename_pattern, pipeline))
}

/// Diagnostics go to stderr so the rendered stream on stdout stays clean.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
