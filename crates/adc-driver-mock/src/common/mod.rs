//! Common infrastructure for the mock ADC.
//!
//! - **mode**: Operational modes (Instant, Realistic)
//! - **errors**: Error injection framework
//! - **rng**: Seeded random number generator

pub mod errors;
pub mod mode;
pub mod rng;

pub use errors::{ErrorConfig, ErrorScenario};
pub use mode::MockMode;
pub use rng::MockRng;
