//! Operational modes for the mock ADC.
//!
//! - **Instant**: Zero delays, deterministic behavior for unit tests
//! - **Realistic**: Each read waits for the configured acquisition times

/// Operational modes for mock devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockMode {
    /// Zero delays - for unit tests
    #[default]
    Instant,
    /// Hardware-like timing - for running the sampler on a host
    Realistic,
}
