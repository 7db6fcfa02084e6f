//! Error types for the ADC sampler.
//!
//! Two layers of errors exist:
//!
//! - [`DriverError`] is what a driver reports. It carries a category
//!   ([`DriverErrorKind`]) and the numeric status code the driver framework
//!   returned, so the integer result codes of a C-style driver API stay
//!   observable after they have been turned into a typed error.
//! - [`SamplerError`] is what the sampler surfaces to its callers. Its variants
//!   follow the sampler's failure points: binding the device, configuring a
//!   channel and reading a sequence.
//!
//! None of these errors stop the sampling loop. They are logged where they
//! happen and handed back as values so callers (and tests) can inspect them.

use thiserror::Error;

// =============================================================================
// Driver Errors
// =============================================================================

/// Category of a driver failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    Initialization,
    Configuration,
    Communication,
    Hardware,
    Timeout,
    Permission,
    InvalidParameter,
    Unknown,
}

impl DriverErrorKind {
    /// Status code a driver framework conventionally reports for this kind
    /// (negated errno values).
    pub fn default_code(&self) -> i32 {
        match self {
            DriverErrorKind::Initialization => -19, // ENODEV
            DriverErrorKind::Configuration => -22,  // EINVAL
            DriverErrorKind::Communication => -5,   // EIO
            DriverErrorKind::Hardware => -5,        // EIO
            DriverErrorKind::Timeout => -116,       // ETIMEDOUT
            DriverErrorKind::Permission => -13,     // EACCES
            DriverErrorKind::InvalidParameter => -22,
            DriverErrorKind::Unknown => -1,
        }
    }
}

impl std::fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DriverErrorKind::Initialization => "initialization",
            DriverErrorKind::Configuration => "configuration",
            DriverErrorKind::Communication => "communication",
            DriverErrorKind::Hardware => "hardware",
            DriverErrorKind::Timeout => "timeout",
            DriverErrorKind::Permission => "permission",
            DriverErrorKind::InvalidParameter => "invalid_parameter",
            DriverErrorKind::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// Error reported by an ADC driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Driver '{driver_type}' {kind} error (code {code}): {message}")]
pub struct DriverError {
    pub driver_type: String,
    pub kind: DriverErrorKind,
    pub code: i32,
    pub message: String,
}

impl DriverError {
    /// Create an error using the conventional status code for `kind`.
    pub fn new(
        driver_type: impl Into<String>,
        kind: DriverErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            driver_type: driver_type.into(),
            kind,
            code: kind.default_code(),
            message: message.into(),
        }
    }

    /// Override the status code, e.g. with the value the framework returned.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    /// The numeric status code (never 0).
    pub fn code(&self) -> i32 {
        self.code
    }
}

// =============================================================================
// Sampler Errors
// =============================================================================

/// Convenience alias for results using [`SamplerError`].
pub type SamplerResult<T> = std::result::Result<T, SamplerError>;

/// Errors surfaced by the sampler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// The ADC peripheral could not be bound by name at startup.
    #[error("Failed to bind ADC device '{device}'")]
    BindFailure { device: String },

    /// A channel could not be configured. Startup continues with the next
    /// channel.
    #[error("Failed to configure channel {channel}: {source}")]
    ChannelConfigFailure {
        channel: u8,
        #[source]
        source: DriverError,
    },

    /// The read-sequence operation failed.
    #[error("ADC read failed: {source}")]
    ReadFailure {
        #[source]
        source: DriverError,
    },

    /// A sample was requested but no device is bound.
    #[error("No ADC device bound")]
    NotBound,
}

impl SamplerError {
    /// Status code in the driver convention: the driver's code where there is
    /// one, `-1` otherwise.
    pub fn code(&self) -> i32 {
        match self {
            SamplerError::ChannelConfigFailure { source, .. }
            | SamplerError::ReadFailure { source } => source.code(),
            SamplerError::BindFailure { .. } | SamplerError::NotBound => -1,
        }
    }

    /// Whether this error came from the read step of a sample cycle.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, SamplerError::ReadFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::new("mock_adc", DriverErrorKind::Hardware, "conversion stalled");
        let text = err.to_string();
        assert!(text.contains("mock_adc"));
        assert!(text.contains("hardware"));
        assert!(text.contains("-5"));
        assert!(text.contains("conversion stalled"));
    }

    #[test]
    fn test_with_code_overrides_default() {
        let err = DriverError::new("mock_adc", DriverErrorKind::Timeout, "no DONE event");
        assert_eq!(err.code(), -116);
        let err = err.with_code(-11);
        assert_eq!(err.code(), -11);
    }

    #[test]
    fn test_sampler_error_codes() {
        let driver = DriverError::new("mock_adc", DriverErrorKind::Configuration, "bad gain");
        let cfg = SamplerError::ChannelConfigFailure {
            channel: 2,
            source: driver.clone(),
        };
        assert_eq!(cfg.code(), -22);
        assert!(cfg.to_string().contains("channel 2"));

        let read = SamplerError::ReadFailure { source: driver };
        assert!(read.is_read_failure());
        assert_eq!(SamplerError::NotBound.code(), -1);
        assert!(!SamplerError::NotBound.is_read_failure());
    }

    #[test]
    fn test_bind_failure_names_device() {
        let err = SamplerError::BindFailure {
            device: "ADC_0".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to bind ADC device 'ADC_0'");
    }
}
