//! Mock driver framework.
//!
//! [`MockAdcPlatform`] stands in for the host operating system's device
//! binding: it hands out registered [`MockAdc`] instances by name and counts
//! calibration triggers.

use crate::mock_adc::MockAdc;
use adc_core::{AdcDevice, AdcPlatform};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Simulated platform implementing [`AdcPlatform`].
#[derive(Debug, Default)]
pub struct MockAdcPlatform {
    devices: HashMap<String, Arc<MockAdc>>,
    bind_attempts: AtomicUsize,
    calibrations: AtomicUsize,
}

impl MockAdcPlatform {
    /// Platform with no devices; every bind fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device under `name`.
    pub fn with_device(mut self, name: impl Into<String>, device: Arc<MockAdc>) -> Self {
        self.devices.insert(name.into(), device);
        self
    }

    pub fn bind_attempts(&self) -> usize {
        self.bind_attempts.load(Ordering::SeqCst)
    }

    pub fn calibration_count(&self) -> usize {
        self.calibrations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdcPlatform for MockAdcPlatform {
    async fn bind(&self, name: &str) -> Option<Arc<dyn AdcDevice>> {
        self.bind_attempts.fetch_add(1, Ordering::SeqCst);
        let device = self.devices.get(name)?;
        debug!(device = name, "Bound mock ADC");
        Some(Arc::clone(device) as Arc<dyn AdcDevice>)
    }

    async fn trigger_calibration(&self) {
        self.calibrations.fetch_add(1, Ordering::SeqCst);
        debug!("Offset calibration triggered");
    }
}
