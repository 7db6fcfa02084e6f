//! Configuration using Figment
//!
//! Every sampler parameter has a default that reproduces the fixed firmware
//! constants (device `ADC_0`, 4 channels, 10-bit resolution, 3.6 V full
//! scale, 1000 ms interval), so no file is required. Values are layered:
//! 1. Built-in defaults
//! 2. A TOML file, if one is given
//! 3. Environment variables prefixed with `ADC_SAMPLER_`, nested keys
//!    separated by `__` (e.g. `ADC_SAMPLER_SAMPLER__CHANNEL_COUNT=2`)
//! 4. Command-line flags (applied by the binary)
//!
//! # Example
//! ```no_run
//! use adc_sampler::config::SamplerConfig;
//!
//! let config = SamplerConfig::load_from("config/sampler.toml")?;
//! config.validate()?;
//! println!("Sampling {} channels", config.sampler.channel_count);
//! # Ok::<(), adc_sampler::config::ConfigError>(())
//! ```

use adc_core::{max_raw, MAX_CHANNELS};
use adc_driver_mock::MockAdcConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ADC_SAMPLER_";

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file or environment could not be parsed into a configuration.
    #[error("Configuration error: {0}")]
    Load(#[from] Box<figment::Error>),

    /// Values parsed but are not usable.
    #[error("Configuration validation error: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Sampling parameters
    #[serde(default)]
    pub sampler: SamplingConfig,
    /// Simulated ADC used when no hardware driver is available
    #[serde(default, skip_serializing)]
    pub mock: MockAdcConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Sampling parameters. Channel count is the one value that sizes the channel
/// table, the mask, the buffer and the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Name of the ADC peripheral to bind
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Number of channels to configure and read
    #[serde(default = "default_channel_count")]
    pub channel_count: usize,
    /// Conversion resolution in bits
    #[serde(default = "default_resolution_bits")]
    pub resolution_bits: u8,
    /// Voltage corresponding to the largest raw value
    #[serde(default = "default_full_scale_voltage")]
    pub full_scale_voltage: f64,
    /// Cycle period in milliseconds
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Stop after this many cycles (None = run forever)
    #[serde(default)]
    pub max_cycles: Option<u64>,
    /// Read once after calibration without reporting the result
    #[serde(default)]
    pub discard_after_calibration: bool,
}

// Default value functions
fn default_name() -> String {
    "ADC Sampler".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_device_name() -> String {
    "ADC_0".to_string()
}

fn default_channel_count() -> usize {
    4
}

fn default_resolution_bits() -> u8 {
    10
}

fn default_full_scale_voltage() -> f64 {
    3.6
}

fn default_sample_interval_ms() -> u64 {
    1000
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            channel_count: default_channel_count(),
            resolution_bits: default_resolution_bits(),
            full_scale_voltage: default_full_scale_voltage(),
            sample_interval_ms: default_sample_interval_ms(),
            max_cycles: None,
            discard_after_calibration: false,
        }
    }
}

impl SamplingConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Largest raw value at the configured resolution.
    pub fn max_raw(&self) -> u32 {
        max_raw(self.resolution_bits)
    }
}

impl SamplerConfig {
    /// Defaults overlaid with environment variables only.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(None::<&Path>)
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Defaults overlaid with a TOML file and then environment variables.
    ///
    /// A missing file is not an error; the defaults and environment apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::figment(Some(path))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    fn figment<P: AsRef<Path>>(path: Option<P>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(SamplerConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path.as_ref()));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.application.log_format.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log_format '{}'. Must be one of: {}",
                self.application.log_format,
                valid_formats.join(", ")
            )));
        }

        let sampler = &self.sampler;
        if sampler.device_name.trim().is_empty() {
            return Err(ConfigError::Invalid("device_name must not be empty".into()));
        }

        if sampler.channel_count == 0 || sampler.channel_count > MAX_CHANNELS {
            return Err(ConfigError::Invalid(format!(
                "Invalid channel_count {}. Must be 1-{}",
                sampler.channel_count, MAX_CHANNELS
            )));
        }

        // Raw samples are stored as i16
        if !(1..=15).contains(&sampler.resolution_bits) {
            return Err(ConfigError::Invalid(format!(
                "Invalid resolution_bits {}. Must be 1-15",
                sampler.resolution_bits
            )));
        }

        if !sampler.full_scale_voltage.is_finite() || sampler.full_scale_voltage <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "Invalid full_scale_voltage {}. Must be a positive number of volts",
                sampler.full_scale_voltage
            )));
        }

        if sampler.sample_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "sample_interval_ms must be greater than 0".into(),
            ));
        }

        if sampler.max_cycles == Some(0) {
            return Err(ConfigError::Invalid(
                "max_cycles must be greater than 0 when set".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.mock.read_failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "Invalid mock read_failure_rate {}. Must be 0.0-1.0",
                self.mock.read_failure_rate
            )));
        }

        Ok(())
    }
}
