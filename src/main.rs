//! CLI Entry Point for adc-sampler
//!
//! Binds the configured ADC, configures its channels, triggers calibration,
//! then samples every channel on a fixed interval until Ctrl+C (or until
//! `--cycles` cycles have run).
//!
//! # Usage
//!
//! ```bash
//! adc-sampler --config config/sampler.toml
//! adc-sampler --channels 2 --interval-ms 250 --cycles 10 --log-level debug
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use adc_driver_mock::{MockAdc, MockAdcPlatform};
use adc_sampler::config::SamplerConfig;
use adc_sampler::sampler::Sampler;
use adc_sampler::tracing_init;
use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "adc-sampler")]
#[command(about = "Periodic multi-channel ADC sampler", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Override the log format (pretty, compact, json)
    #[arg(long)]
    log_format: Option<String>,

    /// Stop after this many cycles instead of running forever
    #[arg(long)]
    cycles: Option<u64>,

    /// Override the cycle period in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Override the number of channels sampled
    #[arg(long)]
    channels: Option<usize>,
}

impl Cli {
    fn apply(&self, config: &mut SamplerConfig) {
        if let Some(level) = &self.log_level {
            config.application.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.application.log_format = format.clone();
        }
        if let Some(cycles) = self.cycles {
            config.sampler.max_cycles = Some(cycles);
        }
        if let Some(interval) = self.interval_ms {
            config.sampler.sample_interval_ms = interval;
        }
        if let Some(channels) = self.channels {
            config.sampler.channel_count = channels;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SamplerConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SamplerConfig::load()?,
    };
    cli.apply(&mut config);
    config.validate()?;

    tracing_init::init_from_config(&config).map_err(anyhow::Error::msg)?;

    info!(
        name = %config.application.name,
        device = %config.sampler.device_name,
        channels = config.sampler.channel_count,
        "Starting ADC sampler"
    );

    let adc = Arc::new(MockAdc::from_config(&config.mock));
    let platform = Arc::new(MockAdcPlatform::new().with_device(&config.sampler.device_name, adc));

    let mut sampler = Sampler::new(platform, config.sampler.clone());
    let report = sampler.initialize().await;
    if !report.is_clean() {
        warn!(
            failures = report.failures.len(),
            "Initialization incomplete, sampling anyway"
        );
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received");
            signal_token.cancel();
        }
    });

    let summary = sampler.run_until(shutdown).await;
    info!(cycles = summary.cycles, "ADC sampler stopped");
    Ok(())
}
