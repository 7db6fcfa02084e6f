//! Mock ADC Driver for adc-sampler
//!
//! This crate provides a simulated ADC platform for testing and for running
//! the sampler on a host without hardware. The mock uses async-safe operations
//! (tokio::time::sleep, not std::thread::sleep).
//!
//! # Available Mocks
//!
//! - [`MockAdcPlatform`] - Simulated driver framework: binds devices by name,
//!   counts calibration triggers
//! - [`MockAdc`] - Simulated multi-channel ADC with scripted or synthesized
//!   samples and error injection
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use adc_driver_mock::{ErrorConfig, ErrorScenario, MockAdc, MockAdcPlatform};
//!
//! let adc = Arc::new(
//!     MockAdc::builder()
//!         .errors(ErrorConfig::scenario(ErrorScenario::FailNth {
//!             operation: "configure_channel",
//!             call: 2,
//!         }))
//!         .build(),
//! );
//! let platform = MockAdcPlatform::new().with_device("ADC_0", adc.clone());
//! ```

pub mod common;
mod mock_adc;
mod mock_platform;

pub use common::{ErrorConfig, ErrorScenario, MockMode, MockRng};
pub use mock_adc::{MockAdc, MockAdcBuilder, MockAdcConfig};
pub use mock_platform::MockAdcPlatform;
