//! Mock ADC peripheral.
//!
//! Simulates a multi-channel successive-approximation ADC:
//! - Channel configuration is recorded, including failed attempts
//! - Reads fail with `-EINVAL` if a selected channel was never configured
//! - Samples come from a script (exact values for tests) or are synthesized
//!   from per-channel input voltages plus uniform noise
//! - Failures can be injected per operation through [`ErrorConfig`]
//!
//! # Example
//!
//! ```rust,ignore
//! use adc_driver_mock::MockAdc;
//!
//! // Exact samples for a test
//! let adc = MockAdc::builder()
//!     .script(vec![vec![100, 200, 300, 400]])
//!     .build();
//!
//! // Noisy simulated inputs for a demo run
//! let adc = MockAdc::builder()
//!     .input_voltages(vec![0.5, 1.2, 2.4, 3.3])
//!     .noise_lsb(2)
//!     .seed(42)
//!     .build();
//! ```

use crate::common::{ErrorConfig, MockMode, MockRng};
use adc_core::{
    max_raw, AdcDevice, ChannelConfig, DriverError, DriverErrorKind, SampleSequence,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

const DRIVER_TYPE: &str = "mock_adc";

// =============================================================================
// MockAdcConfig - configuration file support
// =============================================================================

/// Configuration for the simulated ADC, as read from the `[mock]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MockAdcConfig {
    /// Simulated input voltage per channel; missing channels read 0 V
    #[serde(default = "default_input_voltages")]
    pub input_voltages: Vec<f64>,
    /// Noise amplitude in LSB
    #[serde(default)]
    pub noise_lsb: u16,
    /// Probability that a read fails (0.0 to 1.0)
    #[serde(default)]
    pub read_failure_rate: f64,
    /// RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
    /// Wait for the configured acquisition time on every read
    #[serde(default)]
    pub realistic_timing: bool,
}

fn default_input_voltages() -> Vec<f64> {
    vec![0.5, 1.2, 2.4, 3.3]
}

impl Default for MockAdcConfig {
    fn default() -> Self {
        Self {
            input_voltages: default_input_voltages(),
            noise_lsb: 0,
            read_failure_rate: 0.0,
            seed: None,
            realistic_timing: false,
        }
    }
}

// =============================================================================
// MockAdc
// =============================================================================

/// Simulated ADC peripheral implementing [`AdcDevice`].
pub struct MockAdc {
    name: String,
    mode: MockMode,
    errors: ErrorConfig,
    rng: MockRng,
    input_voltages: Vec<f64>,
    noise_lsb: u16,
    script: Mutex<VecDeque<Vec<i16>>>,
    /// Every configure call, successful or not
    attempts: Mutex<Vec<ChannelConfig>>,
    /// Channels whose last configure call succeeded
    configured: Mutex<BTreeMap<u8, ChannelConfig>>,
    reads: AtomicU64,
}

impl MockAdc {
    /// Mock with default inputs and no injected errors.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> MockAdcBuilder {
        MockAdcBuilder::default()
    }

    /// Build from a `[mock]` configuration section.
    pub fn from_config(config: &MockAdcConfig) -> Self {
        let mut builder = Self::builder()
            .input_voltages(config.input_voltages.clone())
            .noise_lsb(config.noise_lsb)
            .errors(ErrorConfig::with_rates_seeded(
                HashMap::from([("read", config.read_failure_rate)]),
                config.seed,
            ));
        if let Some(seed) = config.seed {
            builder = builder.seed(seed);
        }
        if config.realistic_timing {
            builder = builder.mode(MockMode::Realistic);
        }
        builder.build()
    }

    /// Every configure attempt in call order.
    pub fn configure_attempts(&self) -> Vec<ChannelConfig> {
        self.attempts.lock().clone()
    }

    /// Ids of channels that are currently configured.
    pub fn configured_channels(&self) -> Vec<u8> {
        self.configured.lock().keys().copied().collect()
    }

    /// Number of read calls, including failed ones.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn synthesize(&self, config: &ChannelConfig, resolution_bits: u8) -> i16 {
        let full_scale = config.input_range();
        let max = i32::try_from(max_raw(resolution_bits)).unwrap_or(i32::MAX);
        let input = self
            .input_voltages
            .get(config.channel_id as usize)
            .copied()
            .unwrap_or(0.0);
        let ideal = (input / full_scale * f64::from(max)).round() as i32;
        let raw = (ideal + self.rng.noise_lsb(self.noise_lsb)).clamp(0, max);
        i16::try_from(raw).unwrap_or(i16::MAX)
    }

    async fn acquisition_delay(&self, channels: &[ChannelConfig]) {
        if self.mode != MockMode::Realistic {
            return;
        }
        let micros: u64 = channels
            .iter()
            .filter_map(|c| c.acquisition_time.as_micros())
            .sum();
        tokio::time::sleep(Duration::from_micros(micros)).await;
    }
}

impl Default for MockAdc {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdcDevice for MockAdc {
    fn name(&self) -> &str {
        &self.name
    }

    async fn configure_channel(&self, config: &ChannelConfig) -> Result<(), DriverError> {
        self.attempts.lock().push(*config);
        self.errors.check_operation(DRIVER_TYPE, "configure_channel")?;

        if config.channel_id as usize >= adc_core::MAX_CHANNELS {
            return Err(DriverError::new(
                DRIVER_TYPE,
                DriverErrorKind::InvalidParameter,
                format!("Channel {} does not exist", config.channel_id),
            ));
        }

        self.configured.lock().insert(config.channel_id, *config);
        debug!(
            device = %self.name,
            channel = config.channel_id,
            input = ?config.input_positive,
            "Channel configured"
        );
        Ok(())
    }

    async fn read(&self, sequence: &mut SampleSequence) -> Result<(), DriverError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.errors.check_operation(DRIVER_TYPE, "read")?;

        let selected: Vec<ChannelConfig> = {
            let configured = self.configured.lock();
            let mut selected = Vec::with_capacity(sequence.channels().count());
            for channel in sequence.channels().channels() {
                match configured.get(&channel) {
                    Some(cfg) => selected.push(*cfg),
                    None => {
                        return Err(DriverError::new(
                            DRIVER_TYPE,
                            DriverErrorKind::Configuration,
                            format!("Channel {} is not configured", channel),
                        ))
                    }
                }
            }
            selected
        };

        self.acquisition_delay(&selected).await;

        let scripted = self.script.lock().pop_front();
        let resolution = sequence.resolution_bits();
        for (slot, (i, cfg)) in sequence
            .buffer_mut()
            .iter_mut()
            .zip(selected.iter().enumerate())
        {
            *slot = match &scripted {
                Some(samples) => samples.get(i).copied().unwrap_or(0),
                None => self.synthesize(cfg, resolution),
            };
        }

        trace!(device = %self.name, samples = ?sequence.buffer(), "Sequence converted");
        Ok(())
    }
}

impl std::fmt::Debug for MockAdc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAdc")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("input_voltages", &self.input_voltages)
            .field("noise_lsb", &self.noise_lsb)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`MockAdc`].
#[derive(Debug, Default)]
pub struct MockAdcBuilder {
    name: Option<String>,
    mode: MockMode,
    errors: Option<ErrorConfig>,
    seed: Option<u64>,
    input_voltages: Option<Vec<f64>>,
    noise_lsb: u16,
    script: Vec<Vec<i16>>,
}

impl MockAdcBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn mode(mut self, mode: MockMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn errors(mut self, errors: ErrorConfig) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Seed for the noise generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn input_voltages(mut self, voltages: Vec<f64>) -> Self {
        self.input_voltages = Some(voltages);
        self
    }

    pub fn noise_lsb(mut self, amplitude: u16) -> Self {
        self.noise_lsb = amplitude;
        self
    }

    /// Exact samples returned by successive reads, before falling back to
    /// synthesized values.
    pub fn script(mut self, reads: Vec<Vec<i16>>) -> Self {
        self.script = reads;
        self
    }

    pub fn build(self) -> MockAdc {
        MockAdc {
            name: self.name.unwrap_or_else(|| DRIVER_TYPE.to_string()),
            mode: self.mode,
            errors: self.errors.unwrap_or_default(),
            rng: MockRng::new(self.seed),
            input_voltages: self.input_voltages.unwrap_or_else(default_input_voltages),
            noise_lsb: self.noise_lsb,
            script: Mutex::new(self.script.into()),
            attempts: Mutex::new(Vec::new()),
            configured: Mutex::new(BTreeMap::new()),
            reads: AtomicU64::new(0),
        }
    }
}
