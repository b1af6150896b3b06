//! Per-representation operation dispatch
//!
//! A [`Backend`] says how each [`ResolvedOp`] case acts on one state
//! representation. Both backends share the contraction kernel in
//! `qmoment_state`; they differ in how stochastic operations are treated:
//!
//! | Operation | State vector | Density matrix |
//! |-----------|--------------|----------------|
//! | Unitary   | ψ → Uψ | ρ → UρU† |
//! | Mixture   | one branch, sampled | Σ pᵢ UᵢρUᵢ† |
//! | Channel   | rejected, or sampled by ‖Kψ‖² when opted in | Σ KᵢρKᵢ† |
//! | Measure   | sample, project, renormalize | sample Tr(PρP), project, renormalize |

use crate::config::SimulatorConfig;
use crate::error::{Result, SimulatorError};
use qmoment_core::ResolvedOp;
use qmoment_state::{DensityMatrix, QuantumState, Real, StateVector};
use rand::rngs::StdRng;
use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use tracing::{error, warn};

/// A state representation the engine can drive moment by moment
pub trait Backend: Send + Sync + 'static {
    /// Amplitude precision
    type Real: Real;

    /// State held by one simulation unit
    type State: QuantumState<Self::Real> + Debug + Display + Sync;

    /// Short name, for logs
    const NAME: &'static str;

    /// The computational-basis zero state on `num_qubits` axes
    fn initial_state(num_qubits: usize) -> Result<Self::State>;

    /// Reject operations this representation cannot apply
    ///
    /// Called once per operation when a circuit is prepared, so an
    /// unsupported operation fails before any unit runs.
    fn check_supported(name: &str, op: &ResolvedOp, config: &SimulatorConfig) -> Result<()>;

    /// Apply one operation to `axes`
    ///
    /// Returns the raw measured bits (before any inversion) for a
    /// measurement, `None` otherwise.
    fn apply(
        state: &mut Self::State,
        op: &ResolvedOp,
        axes: &[usize],
        rng: &mut StdRng,
        config: &SimulatorConfig,
    ) -> Result<Option<Vec<bool>>>;

    /// Verify the representation's physical invariants after a moment
    fn check_invariants(state: &Self::State, moment: usize, config: &SimulatorConfig) -> Result<()>;
}

/// Pure-state evolution with Monte Carlo treatment of mixtures
#[derive(Debug, Clone, Copy, Default)]
pub struct StateVectorBackend<T = f32>(PhantomData<fn() -> T>);

/// Mixed-state evolution with exact channels
#[derive(Debug, Clone, Copy, Default)]
pub struct DensityMatrixBackend<T = f32>(PhantomData<fn() -> T>);

fn drift(moment: usize, quantity: &str, deviation: f64, tolerance: f64) -> SimulatorError {
    error!(moment, quantity, deviation, tolerance, "state invariant violated");
    SimulatorError::NumericDrift {
        moment,
        quantity: quantity.to_string(),
        deviation,
        tolerance,
    }
}

impl<T: Real> Backend for StateVectorBackend<T> {
    type Real = T;
    type State = StateVector<T>;

    const NAME: &'static str = "state_vector";

    fn initial_state(num_qubits: usize) -> Result<Self::State> {
        Ok(StateVector::new(num_qubits)?)
    }

    fn check_supported(name: &str, op: &ResolvedOp, config: &SimulatorConfig) -> Result<()> {
        if op.preserves_purity() {
            return Ok(());
        }
        if config.monte_carlo_fallback {
            warn!(operation = name, "sampling a general channel with Monte Carlo fallback");
            return Ok(());
        }
        Err(SimulatorError::UnsupportedOperation {
            name: name.to_string(),
            reason: "general Kraus channels need the density-matrix simulator or the Monte Carlo fallback"
                .to_string(),
        })
    }

    fn apply(
        state: &mut Self::State,
        op: &ResolvedOp,
        axes: &[usize],
        rng: &mut StdRng,
        config: &SimulatorConfig,
    ) -> Result<Option<Vec<bool>>> {
        let threshold = config.kernel_parallel_threshold;
        match op {
            ResolvedOp::Unitary(u) => state.apply_matrix(u, axes, threshold)?,
            ResolvedOp::Mixture(branches) => {
                state.apply_mixture(branches, axes, rng, threshold)?;
            },
            ResolvedOp::Channel(operators) => {
                state.apply_kraus_sampled(operators, axes, rng, threshold)?;
            },
            ResolvedOp::Measure(_) => return Ok(Some(state.measure(axes, rng)?)),
        }
        Ok(None)
    }

    fn check_invariants(state: &Self::State, moment: usize, config: &SimulatorConfig) -> Result<()> {
        let tolerance = config.tolerance_for::<T>();
        let deviation = (state.norm_squared() - 1.0).abs();
        if deviation > tolerance {
            return Err(drift(moment, "norm", deviation, tolerance));
        }
        Ok(())
    }
}

impl<T: Real> Backend for DensityMatrixBackend<T> {
    type Real = T;
    type State = DensityMatrix<T>;

    const NAME: &'static str = "density_matrix";

    fn initial_state(num_qubits: usize) -> Result<Self::State> {
        Ok(DensityMatrix::new(num_qubits)?)
    }

    fn check_supported(_name: &str, _op: &ResolvedOp, _config: &SimulatorConfig) -> Result<()> {
        Ok(())
    }

    fn apply(
        state: &mut Self::State,
        op: &ResolvedOp,
        axes: &[usize],
        rng: &mut StdRng,
        config: &SimulatorConfig,
    ) -> Result<Option<Vec<bool>>> {
        let threshold = config.kernel_parallel_threshold;
        match op {
            ResolvedOp::Unitary(u) => state.apply_unitary(u, axes, threshold)?,
            ResolvedOp::Mixture(branches) => state.apply_mixture(branches, axes, threshold)?,
            ResolvedOp::Channel(operators) => state.apply_kraus(operators, axes, threshold)?,
            ResolvedOp::Measure(_) => return Ok(Some(state.measure(axes, rng)?)),
        }
        Ok(None)
    }

    fn check_invariants(state: &Self::State, moment: usize, config: &SimulatorConfig) -> Result<()> {
        let tolerance = config.tolerance_for::<T>();
        state
            .validate(tolerance, config.check_positivity)
            .map_err(|err| match err {
                qmoment_state::StateError::NumericDrift {
                    quantity,
                    deviation,
                    tolerance,
                } => drift(moment, &quantity, deviation, tolerance),
                other => other.into(),
            })
    }
}
