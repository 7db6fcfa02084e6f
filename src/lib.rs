//! # ADC Sampler Library
//!
//! Periodically samples a multi-channel analog-to-digital converter, converts
//! the raw readings to voltages and logs them, forever, on a fixed interval.
//!
//! The hardware side is reached only through the capability traits in
//! `adc-core` ([`adc_core::AdcPlatform`], [`adc_core::AdcDevice`]); the
//! `adc-driver-mock` crate provides a simulated platform for tests and for
//! running on a host.
//!
//! ## Crate Structure
//!
//! - **`config`**: Figment-based loading and validation of [`config::SamplerConfig`]
//!   (TOML file, `ADC_SAMPLER_*` environment variables).
//! - **`sampler`**: The [`sampler::Sampler`] lifecycle: bind, configure,
//!   calibrate, then the read/convert/report/sleep loop.
//! - **`tracing_init`**: `tracing-subscriber` setup with pretty, compact and
//!   JSON output.

pub mod config;
pub mod sampler;
pub mod tracing_init;

pub use adc_core::{ChannelConfig, SamplerError, SamplerResult};
pub use config::{ConfigError, SamplerConfig, SamplingConfig};
pub use sampler::{ChannelReading, CycleReport, InitReport, RunSummary, Sampler, SamplerState};
