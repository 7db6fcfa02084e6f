//! Error injection framework for the mock ADC.
//!
//! Enables configurable failures so the sampler's log-and-continue behavior
//! can be exercised. Operations are identified by name; the mock ADC uses
//! `"configure_channel"` and `"read"`.

use super::rng::MockRng;
use adc_core::{DriverError, DriverErrorKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Error injection configuration for mock devices
#[derive(Clone, Debug)]
pub struct ErrorConfig {
    /// Per-operation failure rate (0.0 to 1.0), `"*"` matches every operation
    failure_rates: Arc<HashMap<&'static str, f64>>,
    /// Specific failure scenarios
    scenarios: Arc<Vec<ErrorScenario>>,
    /// RNG for failure decisions
    rng: Arc<MockRng>,
    /// State tracking for scenarios
    state: Arc<Mutex<ErrorState>>,
}

#[derive(Debug, Clone)]
pub enum ErrorScenario {
    /// Fail every call after N successful ones
    FailAfterN {
        operation: &'static str,
        count: u32,
    },
    /// Fail only the Nth call (1-based)
    FailNth {
        operation: &'static str,
        call: u32,
    },
    /// Fail every call with a specific status code
    Always {
        operation: &'static str,
        code: i32,
    },
    /// Timeout on specific operation
    Timeout {
        operation: &'static str,
    },
    /// Hardware fault with specific code, sticky once triggered
    HardwareFault {
        code: u32,
    },
}

#[derive(Default, Debug)]
struct ErrorState {
    /// Calls seen per operation
    operation_counts: HashMap<&'static str, u32>,
    /// Hardware fault code (0 = no fault)
    hardware_fault_code: u32,
}

impl ErrorConfig {
    /// Create error config with no errors (default)
    pub fn none() -> Self {
        Self::build(HashMap::new(), Vec::new(), None)
    }

    /// Create error config with uniform random failures
    pub fn random_failures(rate: f64) -> Self {
        Self::random_failures_seeded(rate, None)
    }

    /// Create error config with uniform random failures and specific seed
    pub fn random_failures_seeded(rate: f64, seed: Option<u64>) -> Self {
        let mut rates = HashMap::new();
        rates.insert("*", rate);
        Self::build(rates, Vec::new(), seed)
    }

    /// Create error config with a single scenario
    pub fn scenario(scenario: ErrorScenario) -> Self {
        Self::scenarios(vec![scenario])
    }

    /// Create error config with multiple scenarios
    pub fn scenarios(scenarios: Vec<ErrorScenario>) -> Self {
        Self::build(HashMap::new(), scenarios, None)
    }

    /// Create error config with custom failure rates per operation
    pub fn with_rates(rates: HashMap<&'static str, f64>) -> Self {
        Self::with_rates_seeded(rates, None)
    }

    /// Create error config with custom failure rates and specific seed
    pub fn with_rates_seeded(rates: HashMap<&'static str, f64>, seed: Option<u64>) -> Self {
        Self::build(rates, Vec::new(), seed)
    }

    fn build(
        rates: HashMap<&'static str, f64>,
        scenarios: Vec<ErrorScenario>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            failure_rates: Arc::new(rates),
            scenarios: Arc::new(scenarios),
            rng: Arc::new(MockRng::new(seed)),
            state: Arc::new(Mutex::new(ErrorState::default())),
        }
    }

    /// Check if an operation should fail and return appropriate error
    pub fn check_operation(
        &self,
        driver_type: &str,
        operation: &'static str,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();

        let call = {
            let count = state.operation_counts.entry(operation).or_insert(0);
            *count += 1;
            *count
        };

        if state.hardware_fault_code != 0 {
            return Err(DriverError::new(
                driver_type,
                DriverErrorKind::Hardware,
                format!("Hardware fault: {}", state.hardware_fault_code),
            ));
        }

        for scenario in self.scenarios.iter() {
            match scenario {
                ErrorScenario::FailAfterN {
                    operation: op,
                    count,
                } if *op == operation && call > *count => {
                    return Err(DriverError::new(
                        driver_type,
                        DriverErrorKind::Hardware,
                        format!("Injected failure after {} operations", count),
                    ));
                }
                ErrorScenario::FailNth { operation: op, call: nth }
                    if *op == operation && call == *nth =>
                {
                    return Err(DriverError::new(
                        driver_type,
                        DriverErrorKind::Hardware,
                        format!("Injected failure on call {} of '{}'", nth, operation),
                    ));
                }
                ErrorScenario::Always { operation: op, code } if *op == operation => {
                    return Err(DriverError::new(
                        driver_type,
                        DriverErrorKind::Hardware,
                        format!("Injected failure on '{}'", operation),
                    )
                    .with_code(*code));
                }
                ErrorScenario::Timeout { operation: op } if *op == operation => {
                    return Err(DriverError::new(
                        driver_type,
                        DriverErrorKind::Timeout,
                        format!("Operation '{}' timed out", operation),
                    ));
                }
                ErrorScenario::HardwareFault { code } => {
                    state.hardware_fault_code = *code;
                    return Err(DriverError::new(
                        driver_type,
                        DriverErrorKind::Hardware,
                        format!("Hardware fault: {}", code),
                    ));
                }
                _ => {}
            }
        }

        let rate = self
            .failure_rates
            .get(operation)
            .or_else(|| self.failure_rates.get("*"))
            .copied()
            .unwrap_or(0.0);

        if self.rng.should_fail(rate) {
            return Err(DriverError::new(
                driver_type,
                DriverErrorKind::Hardware,
                format!("Random failure on operation '{}'", operation),
            ));
        }

        Ok(())
    }

    /// Number of times `operation` has been checked.
    pub fn calls(&self, operation: &'static str) -> u32 {
        self.state
            .lock()
            .operation_counts
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Reset error state (clear counters, faults)
    pub fn reset(&self) {
        *self.state.lock() = ErrorState::default();
    }
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self::none()
    }
}
