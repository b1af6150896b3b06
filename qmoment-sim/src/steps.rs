//! Per-moment inspection of a running simulation

use crate::backend::Backend;
use crate::config::SimulatorConfig;
use crate::engine::{self, Measurements};
use crate::error::Result;
use crate::prepared::PreparedCircuit;
use qmoment_core::Qubit;
use qmoment_state::{QuantumState, StateInput};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A finite, single-pass sequence of moment steps
///
/// Each call to [`next_step`](Self::next_step) applies one moment and lends
/// out the state it produced. Overwriting that state through
/// [`StepResult::set_state`] changes what the following moments act on.
/// The sequence cannot be rewound; simulate again to start over.
///
/// # Example
///
/// ```
/// use qmoment_core::{Circuit, Operation, ParamResolver, Qubit, QubitOrder};
/// use qmoment_sim::StateVectorSimulator;
/// use std::sync::Arc;
///
/// let q = Qubit::line(0);
/// let circuit = Circuit::from_operations(vec![
///     Operation::gate(Arc::new(qmoment_gates::x()), &[q.clone()]).unwrap(),
///     Operation::gate(Arc::new(qmoment_gates::x()), &[q]).unwrap(),
/// ]);
///
/// let sim = StateVectorSimulator::<f32>::default();
/// let mut steps = sim
///     .simulate_moment_steps(&circuit, &QubitOrder::Default, &ParamResolver::new())
///     .unwrap();
/// while let Some(step) = steps.next_step() {
///     let step = step.unwrap();
///     println!("{}", step.state());
/// }
/// ```
pub struct MomentSteps<B: Backend> {
    prepared: PreparedCircuit,
    config: SimulatorConfig,
    state: B::State,
    rng: StdRng,
    next: usize,
}

/// The state after one moment and the measurements taken in that moment
pub struct StepResult<'a, B: Backend> {
    moment: usize,
    state: &'a mut B::State,
    measurements: Measurements,
    qubit_order: &'a [Qubit],
}

impl<B: Backend> MomentSteps<B> {
    pub(crate) fn new(
        prepared: PreparedCircuit,
        config: SimulatorConfig,
        initial: Option<&StateInput<B::Real>>,
        seed: u64,
    ) -> Result<Self> {
        let state = engine::initial_state::<B>(prepared.num_qubits(), initial)?;
        Ok(Self {
            prepared,
            config,
            state,
            rng: StdRng::seed_from_u64(seed),
            next: 0,
        })
    }

    /// Apply the next moment
    ///
    /// Returns `None` once every moment has been applied. After an error the
    /// sequence is exhausted.
    pub fn next_step(&mut self) -> Option<Result<StepResult<'_, B>>> {
        let index = self.next;
        let ops = self.prepared.moments().get(index)?;
        self.next += 1;
        match engine::run_moment::<B>(&mut self.state, index, ops, &mut self.rng, &self.config) {
            Ok(measurements) => Some(Ok(StepResult {
                moment: index,
                state: &mut self.state,
                measurements,
                qubit_order: self.prepared.qubit_order(),
            })),
            Err(err) => {
                self.next = self.prepared.num_moments();
                Some(Err(err))
            },
        }
    }

    /// Number of moments not yet applied
    pub fn remaining(&self) -> usize {
        self.prepared.num_moments() - self.next
    }

    /// Current state (the initial state before the first step)
    pub fn state(&self) -> &B::State {
        &self.state
    }

    /// Overwrite the current state before the next step
    pub fn set_state(&mut self, input: impl Into<StateInput<B::Real>>) -> Result<()> {
        Ok(self.state.set_from(input.into())?)
    }

    pub fn qubit_order(&self) -> &[Qubit] {
        self.prepared.qubit_order()
    }

    /// Consume the sequence, returning the current state
    pub fn into_state(self) -> B::State {
        self.state
    }
}

impl<'a, B: Backend> StepResult<'a, B> {
    /// Index of the moment this step applied
    pub fn moment(&self) -> usize {
        self.moment
    }

    pub fn state(&self) -> &B::State {
        self.state
    }

    /// Replace the held state; later moments act on the replacement
    ///
    /// Accepts a full tensor or a computational-basis integer.
    ///
    /// # Errors
    /// Returns `InvalidState` if the input does not fit the register.
    pub fn set_state(&mut self, input: impl Into<StateInput<B::Real>>) -> Result<()> {
        Ok(self.state.set_from(input.into())?)
    }

    /// Measurements recorded in this moment only
    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn qubit_order(&self) -> &[Qubit] {
        self.qubit_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DensityMatrixBackend, StateVectorBackend};
    use crate::error::SimulatorError;
    use qmoment_core::{Circuit, Operation, ParamResolver, QubitOrder};
    use std::sync::Arc;

    fn x_measure_x() -> Circuit {
        let q = Qubit::line(0);
        Circuit::from_operations(vec![
            Operation::gate(Arc::new(qmoment_gates::x()), &[q.clone()]).unwrap(),
            Operation::measure("m", &[q.clone()]).unwrap(),
            Operation::gate(Arc::new(qmoment_gates::x()), &[q]).unwrap(),
        ])
    }

    fn steps<B: Backend>(circuit: &Circuit) -> MomentSteps<B> {
        let config = SimulatorConfig::default();
        let prepared =
            PreparedCircuit::new::<B>(circuit, &QubitOrder::Default, &ParamResolver::new(), &config).unwrap();
        MomentSteps::new(prepared, config, None, 0).unwrap()
    }

    #[test]
    fn test_measurements_are_per_moment() {
        let mut steps = steps::<StateVectorBackend>(&x_measure_x());
        assert_eq!(steps.remaining(), 3);

        let step = steps.next_step().unwrap().unwrap();
        assert!(step.measurements().is_empty());
        let step = steps.next_step().unwrap().unwrap();
        assert_eq!(step.measurements()["m"], vec![true]);
        let step = steps.next_step().unwrap().unwrap();
        assert!(step.measurements().is_empty());
        assert_eq!(step.state().probabilities()[0], 1.0);
        assert!(steps.next_step().is_none());
    }

    #[test]
    fn test_set_state_affects_later_moments() {
        let mut steps = steps::<DensityMatrixBackend>(&x_measure_x());
        let mut step = steps.next_step().unwrap().unwrap();
        step.set_state(0u64).unwrap();

        let step = steps.next_step().unwrap().unwrap();
        assert_eq!(step.measurements()["m"], vec![false]);
        let step = steps.next_step().unwrap().unwrap();
        assert_eq!(step.state().probabilities()[1], 1.0);
    }

    #[test]
    fn test_set_state_rejects_bad_input() {
        let mut steps = steps::<StateVectorBackend>(&x_measure_x());
        let err = steps.set_state(2u64).unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidState(_)));
    }
}
