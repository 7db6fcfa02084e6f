//! The sampling loop.
//!
//! [`Sampler`] owns the whole lifecycle of the ADC:
//!
//! ```text
//! initialize(): bind device -> configure N channels -> trigger calibration
//! run():        loop { read N channels -> convert/report/clear -> sleep }
//! ```
//!
//! Every failure (bind, per-channel configuration, read) is logged where it
//! happens and the sampler carries on; the next scheduled cycle is the only
//! retry. Failures are also returned as [`SamplerError`] values so callers can
//! inspect them.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use adc_sampler::{config::SamplingConfig, sampler::Sampler};
//! use tokio_util::sync::CancellationToken;
//!
//! let mut sampler = Sampler::new(platform, SamplingConfig::default());
//! let report = sampler.initialize().await;
//! for failure in &report.failures {
//!     eprintln!("startup problem: {failure}");
//! }
//!
//! let shutdown = CancellationToken::new();
//! let summary = sampler.run_until(shutdown.clone()).await;
//! ```

use std::sync::Arc;

use adc_core::{
    raw_to_voltage, AdcDevice, AdcPlatform, ChannelConfig, DriverError, DriverErrorKind,
    SampleSequence, SamplerError, SamplerResult,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::SamplingConfig;

/// Lifecycle state of a [`Sampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Binding and configuring; no cycle has run yet.
    Configuring,
    /// Initialization finished; cycles may run.
    Sampling,
}

/// Outcome of [`Sampler::initialize`].
#[derive(Debug, Clone, PartialEq)]
pub struct InitReport {
    /// Whether a device handle was obtained.
    pub bound: bool,
    /// Everything that went wrong, in the order it happened.
    pub failures: Vec<SamplerError>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.bound && self.failures.is_empty()
    }
}

/// One channel of one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReading {
    pub channel: u8,
    pub raw: i16,
    pub voltage: f64,
}

/// Everything reported by one successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    pub readings: Vec<ChannelReading>,
}

/// How far [`Sampler::run_until`] got before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Loop iterations completed, failed cycles included.
    pub cycles: u64,
}

/// Periodic multi-channel ADC sampler.
pub struct Sampler {
    platform: Arc<dyn AdcPlatform>,
    settings: SamplingConfig,
    channels: Vec<ChannelConfig>,
    device: Option<Arc<dyn AdcDevice>>,
    sequence: SampleSequence,
    state: SamplerState,
    cycles: u64,
}

impl Sampler {
    /// Create a sampler for `settings.channel_count` standard channels.
    ///
    /// Nothing touches the hardware until [`initialize`](Self::initialize).
    pub fn new(platform: Arc<dyn AdcPlatform>, settings: SamplingConfig) -> Self {
        let channels = ChannelConfig::standard_table(settings.channel_count);
        let sequence = SampleSequence::new(channels.len(), settings.resolution_bits);
        Self {
            platform,
            settings,
            channels,
            device: None,
            sequence,
            state: SamplerState::Configuring,
            cycles: 0,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.device.is_some()
    }

    pub fn channels(&self) -> &[ChannelConfig] {
        &self.channels
    }

    /// The sample sequence reused by every cycle.
    pub fn sequence(&self) -> &SampleSequence {
        &self.sequence
    }

    pub fn settings(&self) -> &SamplingConfig {
        &self.settings
    }

    /// Bind the device, configure every channel and trigger calibration.
    ///
    /// Never fails: a missing device or a channel that refuses its settings is
    /// logged, recorded in the report, and startup continues. Calibration is
    /// triggered regardless.
    #[instrument(skip(self), fields(device = %self.settings.device_name))]
    pub async fn initialize(&mut self) -> InitReport {
        self.state = SamplerState::Configuring;
        let mut failures = Vec::new();

        self.device = self.platform.bind(&self.settings.device_name).await;
        match &self.device {
            Some(device) => info!(driver = device.name(), "ADC device bound"),
            None => {
                error!("device binding failed");
                failures.push(SamplerError::BindFailure {
                    device: self.settings.device_name.clone(),
                });
            }
        }

        if let Some(first) = self.channels.first() {
            let derived = first.input_range();
            if (derived - self.settings.full_scale_voltage).abs() > 1e-6 {
                warn!(
                    configured = self.settings.full_scale_voltage,
                    derived, "Full-scale voltage does not match channel gain and reference"
                );
            }
        }

        for cfg in &self.channels {
            let result = match &self.device {
                Some(device) => device.configure_channel(cfg).await,
                None => Err(DriverError::new(
                    "unbound",
                    DriverErrorKind::Initialization,
                    "no device bound",
                )),
            };
            if let Err(source) = result {
                error!(
                    channel = cfg.channel_id,
                    code = source.code(),
                    error = %source,
                    "Error in ADC setup"
                );
                failures.push(SamplerError::ChannelConfigFailure {
                    channel: cfg.channel_id,
                    source,
                });
            }
        }

        self.platform.trigger_calibration().await;
        debug!("Offset calibration triggered");

        if self.settings.discard_after_calibration {
            self.discard_one().await;
        }

        self.state = SamplerState::Sampling;
        info!(
            channels = self.channels.len(),
            failures = failures.len(),
            "ADC initialization finished"
        );

        InitReport {
            bound: self.device.is_some(),
            failures,
        }
    }

    /// Run one read/convert/report/clear cycle.
    ///
    /// Returns [`SamplerError::NotBound`] without touching the buffer when no
    /// device is bound. A failed read is logged and the buffer is still
    /// reported and cleared before [`SamplerError::ReadFailure`] is returned.
    pub async fn sample_once(&mut self) -> SamplerResult<CycleReport> {
        let Some(device) = self.device.clone() else {
            return Err(SamplerError::NotBound);
        };

        let read = device.read(&mut self.sequence).await;
        if let Err(e) = &read {
            error!(code = e.code(), error = %e, "ADC read err");
        }

        self.cycles += 1;
        let readings = self.drain();

        match read {
            Ok(()) => Ok(CycleReport {
                cycle: self.cycles,
                readings,
            }),
            Err(source) => Err(SamplerError::ReadFailure { source }),
        }
    }

    /// Sample forever.
    ///
    /// Only returns if `max_cycles` is configured.
    pub async fn run(&mut self) -> RunSummary {
        self.run_until(CancellationToken::new()).await
    }

    /// Sample until `shutdown` is cancelled or `max_cycles` cycles have run.
    ///
    /// Cancellation is observed while waiting for the next cycle, so a cycle
    /// in progress always completes.
    pub async fn run_until(&mut self, shutdown: CancellationToken) -> RunSummary {
        let interval = self.settings.sample_interval();
        let mut cycles = 0u64;

        info!(
            interval_ms = self.settings.sample_interval_ms,
            channels = self.channels.len(),
            "Sampling started"
        );

        loop {
            if let Err(e) = self.sample_once().await {
                error!(code = e.code(), error = %e, "Error in adc sampling");
            }
            cycles += 1;

            if self.settings.max_cycles.is_some_and(|max| cycles >= max) {
                info!(cycles, "Cycle limit reached");
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(cycles, "Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        RunSummary { cycles }
    }

    /// Convert, report and zero every slot of the buffer.
    fn drain(&mut self) -> Vec<ChannelReading> {
        let resolution = self.sequence.resolution_bits();
        let full_scale = self.settings.full_scale_voltage;
        let mut readings = Vec::with_capacity(self.channels.len());

        for (i, cfg) in self.channels.iter().enumerate() {
            let raw = self.sequence.buffer().get(i).copied().unwrap_or(0);
            let voltage = raw_to_voltage(raw, resolution, full_scale);

            debug!(channel = cfg.channel_id, raw, "Raw {} : {}", i, raw);
            info!(channel = cfg.channel_id, voltage, "CH {}: ADC {:.6}", i, voltage);

            readings.push(ChannelReading {
                channel: cfg.channel_id,
                raw,
                voltage,
            });
            self.sequence.clear_slot(i);
        }

        readings
    }

    /// Read once and drop the result; the first conversion after calibration
    /// is inaccurate.
    async fn discard_one(&mut self) {
        let Some(device) = self.device.clone() else {
            return;
        };
        match device.read(&mut self.sequence).await {
            Ok(()) => debug!("Discarded first conversion after calibration"),
            Err(e) => warn!(code = e.code(), error = %e, "Post-calibration read failed"),
        }
        for i in 0..self.channels.len() {
            self.sequence.clear_slot(i);
        }
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("device_name", &self.settings.device_name)
            .field("bound", &self.device.is_some())
            .field("channels", &self.channels.len())
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adc_driver_mock::{ErrorConfig, ErrorScenario, MockAdc, MockAdcPlatform};
    use std::time::Duration;
    use tracing_test::traced_test;

    const TOLERANCE: f64 = 1e-4;

    fn platform_with(adc: MockAdc) -> (Arc<MockAdcPlatform>, Arc<MockAdc>) {
        let adc = Arc::new(adc);
        let platform = Arc::new(MockAdcPlatform::new().with_device("ADC_0", Arc::clone(&adc)));
        (platform, adc)
    }

    #[tokio::test]
    async fn test_initialize_configures_all_channels() {
        let (platform, adc) = platform_with(MockAdc::new());
        let mut sampler = Sampler::new(platform.clone(), SamplingConfig::default());
        assert_eq!(sampler.state(), SamplerState::Configuring);

        let report = sampler.initialize().await;

        assert!(report.is_clean());
        assert_eq!(sampler.state(), SamplerState::Sampling);
        assert_eq!(adc.configured_channels(), vec![0, 1, 2, 3]);
        assert_eq!(platform.calibration_count(), 1);
    }

    #[tokio::test]
    async fn test_configuration_failure_does_not_short_circuit() {
        let (platform, adc) = platform_with(
            MockAdc::builder()
                .errors(ErrorConfig::scenarios(vec![
                    ErrorScenario::FailNth {
                        operation: "configure_channel",
                        call: 1,
                    },
                    ErrorScenario::FailNth {
                        operation: "configure_channel",
                        call: 3,
                    },
                ]))
                .build(),
        );
        let mut sampler = Sampler::new(platform.clone(), SamplingConfig::default());

        let report = sampler.initialize().await;

        assert!(report.bound);
        assert_eq!(adc.configure_attempts().len(), 4);
        assert_eq!(adc.configured_channels(), vec![1, 3]);
        let failed: Vec<u8> = report
            .failures
            .iter()
            .filter_map(|f| match f {
                SamplerError::ChannelConfigFailure { channel, .. } => Some(*channel),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec![0, 2]);
        assert_eq!(platform.calibration_count(), 1);
    }

    #[tokio::test]
    async fn test_bind_failure_continues_and_calibrates() {
        let platform = Arc::new(MockAdcPlatform::new());
        let settings = SamplingConfig {
            device_name: "ADC_7".into(),
            ..Default::default()
        };
        let mut sampler = Sampler::new(platform.clone(), settings);

        let report = sampler.initialize().await;

        assert!(!report.bound);
        assert_eq!(
            report.failures[0],
            SamplerError::BindFailure {
                device: "ADC_7".into()
            }
        );
        // One failure per channel after the bind failure
        assert_eq!(report.failures.len(), 5);
        assert_eq!(platform.calibration_count(), 1);
        assert_eq!(platform.bind_attempts(), 1);
        assert_eq!(sampler.state(), SamplerState::Sampling);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_sample_once_without_device() {
        // Device registered under another name, so binding "ADC_0" fails
        let adc = Arc::new(MockAdc::builder().script(vec![vec![1, 2, 3, 4]]).build());
        let platform = Arc::new(MockAdcPlatform::new().with_device("ADC_1", Arc::clone(&adc)));
        let mut sampler = Sampler::new(platform, SamplingConfig::default());
        sampler.initialize().await;
        sampler
            .sequence
            .buffer_mut()
            .copy_from_slice(&[11, 22, 33, 44]);
        let before = sampler.sequence().clone();

        let result = sampler.sample_once().await;

        assert_eq!(result, Err(SamplerError::NotBound));
        assert_eq!(result.unwrap_err().code(), -1);
        assert_eq!(sampler.sequence(), &before);
        assert_eq!(sampler.sequence().buffer(), &[11, 22, 33, 44]);
        assert_eq!(adc.read_count(), 0);
        assert!(!logs_contain("CH 0: ADC"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_sample_once_converts_and_reports() {
        let (platform, _adc) = platform_with(
            MockAdc::builder()
                .script(vec![vec![100, 200, 300, 400]])
                .build(),
        );
        let mut sampler = Sampler::new(platform, SamplingConfig::default());
        sampler.initialize().await;

        let report = sampler.sample_once().await.unwrap();

        assert_eq!(report.cycle, 1);
        let raws: Vec<i16> = report.readings.iter().map(|r| r.raw).collect();
        assert_eq!(raws, vec![100, 200, 300, 400]);
        for (reading, raw) in report.readings.iter().zip([100.0, 200.0, 300.0, 400.0]) {
            assert!((reading.voltage - raw * 3.6 / 1023.0).abs() < TOLERANCE);
        }
        assert!(sampler.sequence().is_cleared());

        assert!(logs_contain("CH 0: ADC 0.351906"));
        assert!(logs_contain("CH 3: ADC 1.407625"));
        assert!(logs_contain("Raw 2 : 300"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_read_failure_still_reports_and_clears() {
        let (platform, adc) = platform_with(
            MockAdc::builder()
                .errors(ErrorConfig::scenario(ErrorScenario::Always {
                    operation: "read",
                    code: -5,
                }))
                .build(),
        );
        let mut sampler = Sampler::new(platform, SamplingConfig::default());
        sampler.initialize().await;

        let err = sampler.sample_once().await.unwrap_err();

        assert!(err.is_read_failure());
        assert_eq!(err.code(), -5);
        assert_eq!(adc.read_count(), 1);
        assert!(sampler.sequence().is_cleared());
        assert!(logs_contain("ADC read err"));
        assert!(logs_contain("CH 0: ADC 0.000000"));
    }

    #[tokio::test]
    async fn test_channel_count_drives_mask_buffer_and_report() {
        let (platform, adc) = platform_with(MockAdc::builder().script(vec![vec![10, 20]]).build());
        let settings = SamplingConfig {
            channel_count: 2,
            ..Default::default()
        };
        let mut sampler = Sampler::new(platform, settings);
        sampler.initialize().await;

        assert_eq!(sampler.sequence().channels().bits(), 0b11);
        assert_eq!(sampler.sequence().buffer().len(), 2);
        assert_eq!(adc.configure_attempts().len(), 2);

        let report = sampler.sample_once().await.unwrap();
        assert_eq!(report.readings.len(), 2);
    }

    #[tokio::test]
    async fn test_discard_after_calibration() {
        let (platform, adc) = platform_with(
            MockAdc::builder()
                .script(vec![vec![999, 999, 999, 999], vec![1, 2, 3, 4]])
                .build(),
        );
        let settings = SamplingConfig {
            discard_after_calibration: true,
            ..Default::default()
        };
        let mut sampler = Sampler::new(platform, settings);
        sampler.initialize().await;
        assert_eq!(adc.read_count(), 1);
        assert!(sampler.sequence().is_cleared());

        let report = sampler.sample_once().await.unwrap();
        assert_eq!(report.cycle, 1);
        assert_eq!(report.readings[0].raw, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_consecutive_read_failures() {
        let (platform, adc) = platform_with(
            MockAdc::builder()
                .errors(ErrorConfig::scenario(ErrorScenario::FailAfterN {
                    operation: "read",
                    count: 0,
                }))
                .build(),
        );
        let settings = SamplingConfig {
            max_cycles: Some(5),
            ..Default::default()
        };
        let mut sampler = Sampler::new(platform, settings);
        sampler.initialize().await;

        let summary = sampler.run().await;

        assert_eq!(summary.cycles, 5);
        assert_eq!(adc.read_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_run_logs_cycle_errors_again() {
        let (platform, _adc) = platform_with(
            MockAdc::builder()
                .errors(ErrorConfig::scenario(ErrorScenario::Always {
                    operation: "read",
                    code: -5,
                }))
                .build(),
        );
        let settings = SamplingConfig {
            max_cycles: Some(1),
            ..Default::default()
        };
        let mut failing = Sampler::new(platform, settings.clone());
        failing.initialize().await;
        assert_eq!(failing.run().await.cycles, 1);

        assert!(logs_contain("ADC read err"));
        assert!(logs_contain("Error in adc sampling"));
        assert!(logs_contain("code=-5"));

        let mut unbound = Sampler::new(Arc::new(MockAdcPlatform::new()), settings);
        unbound.initialize().await;
        assert_eq!(unbound.run().await.cycles, 1);

        assert!(logs_contain("code=-1"));
        assert!(logs_contain("No ADC device bound"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_between_cycles() {
        let (platform, _adc) = platform_with(MockAdc::new());
        let settings = SamplingConfig {
            max_cycles: Some(3),
            ..Default::default()
        };
        let mut sampler = Sampler::new(platform, settings);
        sampler.initialize().await;

        let start = tokio::time::Instant::now();
        sampler.run().await;

        // Sleeps only between cycles
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2000), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2100), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_stops_on_cancel() {
        let (platform, adc) = platform_with(MockAdc::new());
        let mut sampler = Sampler::new(platform, SamplingConfig::default());
        sampler.initialize().await;

        let shutdown = CancellationToken::new();
        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let summary = sampler.run_until(shutdown).await;

        // Cycles at t = 0, 1000 and 2000 ms, cancelled during the third sleep
        assert_eq!(summary.cycles, 3);
        assert_eq!(adc.read_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_without_device_keeps_looping() {
        let platform = Arc::new(MockAdcPlatform::new());
        let settings = SamplingConfig {
            max_cycles: Some(3),
            ..Default::default()
        };
        let mut sampler = Sampler::new(platform, settings);
        sampler.initialize().await;

        assert_eq!(sampler.run().await.cycles, 3);
    }
}
