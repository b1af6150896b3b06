//! Simulator configuration

use crate::cancellation::CancellationToken;
use crate::error::{Result, SimulatorError};
use qmoment_state::Real;
use serde::{Deserialize, Serialize};

/// What a sweep does when one of its units fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Abort the sweep with the first failure in logical order
    #[default]
    FailFast,
    /// Keep successful units and report each failure with its position
    CollectPerUnit,
}

/// Configuration for the simulators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    ///
    /// The same seed and inputs reproduce bit-identical measurement
    /// outcomes, whatever the thread scheduling.
    ///
    /// Default: None (seeded from entropy)
    pub seed: Option<u64>,

    /// Let the state-vector engine sample general Kraus channels
    ///
    /// When false, a channel that is not a mixture of unitaries is rejected
    /// with `UnsupportedOperation`. When true, one Kraus operator is chosen
    /// with probability ‖Kψ‖² and the state renormalized.
    ///
    /// Default: false
    pub monte_carlo_fallback: bool,

    /// Tolerance for invariant checks
    ///
    /// Default: None (1e-4 for `f32` amplitudes, 1e-10 for `f64`)
    pub tolerance: Option<f64>,

    /// Check the norm or trace and Hermiticity after every moment
    ///
    /// Default: true
    pub check_invariants: bool,

    /// Also check that density matrices stay positive semidefinite
    ///
    /// Requires an eigendecomposition per moment.
    ///
    /// Default: false
    pub check_positivity: bool,

    /// Run independent sweep units on the rayon thread pool
    ///
    /// Default: true
    pub parallel: bool,

    /// Axis count from which the contraction kernel splits work across
    /// threads
    ///
    /// Default: 14
    pub kernel_parallel_threshold: usize,

    /// Failure handling for sweeps
    ///
    /// Default: [`ErrorPolicy::FailFast`]
    pub error_policy: ErrorPolicy,

    /// Checked between moments; a cancelled token aborts the unit
    #[serde(skip)]
    pub cancellation: Option<CancellationToken>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            monte_carlo_fallback: false,
            tolerance: None,
            check_invariants: true,
            check_positivity: false,
            parallel: true,
            kernel_parallel_threshold: 14,
            error_policy: ErrorPolicy::FailFast,
            cancellation: None,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for reproducible debugging
    ///
    /// - Fixed seed
    /// - Sequential units
    /// - Positivity checks enabled
    pub fn debug() -> Self {
        Self {
            seed: Some(42),
            parallel: false,
            check_positivity: true,
            ..Default::default()
        }
    }

    /// Set the random seed for deterministic execution
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Opt in to Monte Carlo sampling of general channels
    pub fn with_monte_carlo_fallback(mut self, enabled: bool) -> Self {
        self.monte_carlo_fallback = enabled;
        self
    }

    /// Set the invariant tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Enable or disable invariant checks
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    /// Enable or disable the positivity check
    pub fn with_positivity_check(mut self, enabled: bool) -> Self {
        self.check_positivity = enabled;
        self
    }

    /// Enable or disable parallel sweep units
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Set the kernel parallel threshold
    pub fn with_kernel_parallel_threshold(mut self, num_axes: usize) -> Self {
        self.kernel_parallel_threshold = num_axes;
        self
    }

    /// Set the sweep error policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Tolerance for amplitudes of type `T`
    pub fn tolerance_for<T: Real>(&self) -> f64 {
        self.tolerance.unwrap_or(T::DEFAULT_TOLERANCE)
    }

    /// True if the attached token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(tolerance) = self.tolerance {
            if !(tolerance > 0.0 && tolerance < 1.0) {
                return Err(SimulatorError::InvalidConfig(format!(
                    "tolerance must be in (0, 1), got {}",
                    tolerance
                )));
            }
        }

        if self.check_positivity && !self.check_invariants {
            return Err(SimulatorError::InvalidConfig(
                "check_positivity requires check_invariants".to_string(),
            ));
        }

        Ok(())
    }
}
