//! Core types and traits for the ADC sampler.
//!
//! This crate holds everything the sampler and the drivers have to agree on:
//!
//! - [`channel`] - Per-channel hardware settings ([`ChannelConfig`]) and the
//!   enumerations they are built from
//! - [`sequence`] - The sample sequence descriptor ([`SampleSequence`]) and the
//!   channel selection mask ([`ChannelMask`])
//! - [`conversion`] - Raw sample to voltage conversion
//! - [`capabilities`] - The async capability traits a driver framework provides
//!   ([`AdcPlatform`], [`AdcDevice`])
//! - [`error`] - Driver and sampler error types
//!
//! # Example
//!
//! ```rust,ignore
//! use adc_core::{AdcPlatform, ChannelConfig, SampleSequence};
//!
//! let device = platform.bind("ADC_0").await.ok_or("no ADC")?;
//! let channels = ChannelConfig::standard_table(4);
//! for cfg in &channels {
//!     device.configure_channel(cfg).await?;
//! }
//!
//! let mut sequence = SampleSequence::new(4, 10);
//! device.read(&mut sequence).await?;
//! println!("raw samples: {:?}", sequence.buffer());
//! ```

pub mod capabilities;
pub mod channel;
pub mod conversion;
pub mod error;
pub mod sequence;

pub use capabilities::{AdcDevice, AdcPlatform};
pub use channel::{AcquisitionTime, AnalogInput, ChannelConfig, Gain, Reference, MAX_CHANNELS};
pub use conversion::{max_raw, raw_to_voltage};
pub use error::{DriverError, DriverErrorKind, SamplerError, SamplerResult};
pub use sequence::{ChannelMask, SampleSequence};
