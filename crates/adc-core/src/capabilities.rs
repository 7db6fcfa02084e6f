//! ADC Capabilities
//!
//! The sampler does not talk to hardware itself. It consumes two small
//! capability traits that a driver framework implements:
//!
//! - [`AdcPlatform`] - discovers a peripheral by name and owns the one-shot
//!   calibration trigger
//! - [`AdcDevice`] - a bound peripheral that can configure channels and read
//!   sample sequences
//!
//! # Design
//!
//! Each capability trait:
//! - Is async (uses #[async_trait])
//! - Is thread-safe (requires Send + Sync)
//! - Reports failures as [`DriverError`] carrying the driver's status code
//!
//! # Example
//!
//! ```rust,ignore
//! async fn read_all<D: AdcDevice + ?Sized>(device: &D, count: usize) -> Result<Vec<i16>, DriverError> {
//!     for cfg in ChannelConfig::standard_table(count) {
//!         device.configure_channel(&cfg).await?;
//!     }
//!     let mut sequence = SampleSequence::new(count, 10);
//!     device.read(&mut sequence).await?;
//!     Ok(sequence.buffer().to_vec())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::channel::ChannelConfig;
use crate::error::DriverError;
use crate::sequence::SampleSequence;

/// Capability: Peripheral Discovery
///
/// The driver framework that knows which ADC peripherals exist.
#[async_trait]
pub trait AdcPlatform: Send + Sync {
    /// Look up an ADC peripheral by its device name.
    ///
    /// # Returns
    /// - `Some(device)` if the peripheral exists and is ready
    /// - `None` if no such device is available
    async fn bind(&self, name: &str) -> Option<Arc<dyn AdcDevice>>;

    /// Fire the one-shot offset calibration.
    ///
    /// Fire-and-forget: nothing is reported back. The first conversion after
    /// the trigger is expected to be inaccurate.
    async fn trigger_calibration(&self);
}

/// Capability: Analog Sampling
///
/// A bound ADC peripheral.
///
/// # Contract
/// - `configure_channel` is called once per channel before the first read
/// - `read` fills `sequence.buffer_mut()` in channel-index order, one slot per
///   selected channel, and returns only when the conversion is complete
/// - On a read error the buffer contents are unspecified
#[async_trait]
pub trait AdcDevice: Send + Sync {
    /// Driver identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Apply the settings of one channel.
    async fn configure_channel(&self, config: &ChannelConfig) -> Result<(), DriverError>;

    /// Convert every channel selected by the sequence into its buffer.
    async fn read(&self, sequence: &mut SampleSequence) -> Result<(), DriverError>;
}
