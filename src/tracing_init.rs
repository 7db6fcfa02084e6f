//! Tracing Infrastructure
//!
//! Installs the `tracing-subscriber` stack the sampler logs through. Events
//! carry structured fields (`channel`, `raw`, `voltage`, `code`) and can be
//! printed pretty, compact or as JSON. `RUST_LOG` wins over the configured
//! level.
//!
//! # Example
//! ```no_run
//! use adc_sampler::{config::SamplerConfig, tracing_init};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SamplerConfig::load()?;
//! tracing_init::init_from_config(&config)?;
//! tracing::info!("Sampler starting");
//! # Ok(())
//! # }
//! ```

use crate::config::SamplerConfig;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Multi-line, colored (for development)
    Pretty,
    /// Single line, no colors (for serial consoles and files)
    Compact,
    /// One JSON object per event (for log aggregation)
    Json,
}

/// Resolved logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingConfig {
    pub level: Level,
    pub format: OutputFormat,
}

impl TracingConfig {
    /// Settings from the `[application]` section.
    pub fn from_config(config: &SamplerConfig) -> Result<Self, String> {
        Ok(Self {
            level: parse_log_level(&config.application.log_level)?,
            format: parse_output_format(&config.application.log_format)?,
        })
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string().to_lowercase()))
    }
}

/// Initialize tracing from the application configuration
pub fn init_from_config(config: &SamplerConfig) -> Result<(), String> {
    init(TracingConfig::from_config(config)?)
}

/// Install the global subscriber.
///
/// A subscriber that is already installed is left in place and `Ok(())` is
/// returned.
pub fn init(config: TracingConfig) -> Result<(), String> {
    let filter = config.filter();

    let layer = match config.format {
        OutputFormat::Pretty => fmt::layer().pretty().with_filter(filter).boxed(),
        OutputFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(false)
            .with_filter(filter)
            .boxed(),
        OutputFormat::Json => fmt::layer().json().with_filter(filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .or_else(|e| {
            if e
                .to_string()
                .contains("a global default trace dispatcher has already been set")
            {
                Ok(())
            } else {
                Err(format!("Failed to initialize tracing: {}", e))
            }
        })
}

/// Parse log level string into tracing Level
pub fn parse_log_level(level: &str) -> Result<Level, String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(format!(
            "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
            level
        )),
    }
}

/// Parse output format string
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "pretty" => Ok(OutputFormat::Pretty),
        "compact" => Ok(OutputFormat::Compact),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid log format '{}'. Must be one of: pretty, compact, json",
            format
        )),
    }
}
