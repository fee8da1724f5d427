//! Sumi-Probe main entry point
//!
//! This is the command-line interface for the Sumi-Probe HTTP prober.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_probe::config::{load_config, parse_header, validate, Config, OutputFormat};
use sumi_probe::prober::open_input;
use sumi_probe::Prober;
use tracing_subscriber::EnvFilter;

/// Sumi-Probe: a concurrent HTTP/HTTPS prober
///
/// Reads one URL per line, requests each through a bounded worker pool and
/// prints one record per response. Blank lines and malformed URLs are skipped.
#[derive(Parser, Debug)]
#[command(name = "sumi-probe")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent HTTP/HTTPS prober", long_about = None)]
struct Cli {
    /// Input file with one URL per line ("-" for standard input)
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    input: PathBuf,

    /// TOML configuration file providing defaults for every option
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output one JSON record per line
    #[arg(short, long)]
    json: bool,

    /// Follow every redirect, not only same-resource scheme upgrades
    #[arg(short = 'r', long)]
    follow_redirects: bool,

    /// Number of concurrent workers
    #[arg(short = 't', long, value_name = "N")]
    workers: Option<usize>,

    /// Request timeout in seconds
    #[arg(short = 'k', long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Maximum redirect depth for followed redirects
    #[arg(long, value_name = "N")]
    max_redirects: Option<u32>,

    /// Save raw responses and write records to <OUTPUT>/index
    #[arg(short, long)]
    save: bool,

    /// Output directory for saved responses
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Drop HTML responses with status 404 or 429
    #[arg(long, value_name = "BOOL")]
    ignore_noise: Option<bool>,

    /// Extra request header, repeatable ("Name: Value")
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything but errors on stderr
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Builds the effective configuration: file values, then flags on top
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => Config::default(),
        };

        if self.json {
            config.output.format = OutputFormat::Json;
        }
        if self.follow_redirects {
            config.probe.follow_redirects = true;
        }
        if let Some(workers) = self.workers {
            config.probe.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.probe.timeout_secs = timeout;
        }
        if let Some(max_redirects) = self.max_redirects {
            config.probe.max_redirects = max_redirects;
        }
        if self.save {
            config.output.save_responses = true;
        }
        if let Some(directory) = self.output {
            config.output.directory = directory;
        }
        if let Some(ignore_noise) = self.ignore_noise {
            config.probe.ignore_noise = ignore_noise;
        }
        for header in &self.headers {
            let (name, value) = parse_header(header)?;
            config.headers.insert(name, value);
        }

        validate(&config)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let input = cli.input.clone();
    let config = cli.into_config()?;
    tracing::debug!(
        "Workers: {}, timeout: {}s, follow redirects: {}, max redirects: {}",
        config.probe.workers,
        config.probe.timeout_secs,
        config.probe.follow_redirects,
        config.probe.max_redirects
    );

    let reader = open_input(Some(&input))
        .await
        .with_context(|| format!("Failed to open input {}", input.display()))?;

    let prober = Prober::new(&config).context("Failed to set up prober")?;
    let summary = prober.run(reader).await?;

    tracing::info!(
        "Done: {} submitted, {} followed, {} emitted, {} failed, {} discarded, {} malformed, {} over redirect depth",
        summary.submitted,
        summary.followed,
        summary.emitted,
        summary.failed,
        summary.discarded,
        summary.malformed,
        summary.depth_exceeded
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Diagnostics go to stderr; stdout is reserved for records.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
            0 => EnvFilter::new("sumi_probe=warn"),
            1 => EnvFilter::new("sumi_probe=debug,warn"),
            _ => EnvFilter::new("sumi_probe=trace,debug"),
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
