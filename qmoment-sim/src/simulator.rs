//! Simulator entry points and the sweep driver

use crate::backend::{Backend, DensityMatrixBackend, StateVectorBackend};
use crate::config::{ErrorPolicy, SimulatorConfig};
use crate::engine::{self, Measurements};
use crate::error::{Result, SimulatorError};
use crate::prepared::PreparedCircuit;
use crate::result::{RunResult, SimulationTrialResult, SweepOutcome};
use crate::steps::MomentSteps;
use qmoment_core::{Circuit, ParamResolver, QubitOrder, Sweep};
use qmoment_state::StateInput;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::marker::PhantomData;
use tracing::{debug, info, info_span};

/// Moment-by-moment circuit simulator over backend `B`
///
/// Every (resolver, repetition) pair is an independent unit with its own
/// state and its own `StdRng`. Unit seeds are drawn in logical order from a
/// master generator seeded by [`SimulatorConfig::seed`], so a fixed seed
/// reproduces outcomes bit for bit whether units run in parallel or not.
///
/// # Example
///
/// ```
/// use qmoment_core::noise::BitFlip;
/// use qmoment_core::{Circuit, Operation, ParamResolver, Qubit};
/// use qmoment_sim::{DensityMatrixSimulator, SimulatorConfig};
/// use std::sync::Arc;
///
/// let q = Qubit::line(0);
/// let circuit = Circuit::from_operations(vec![
///     Operation::channel(Arc::new(BitFlip::new(0.25)), &[q.clone()]).unwrap(),
///     Operation::measure("m", &[q]).unwrap(),
/// ]);
///
/// let sim = DensityMatrixSimulator::<f64>::new(SimulatorConfig::new().with_seed(1)).unwrap();
/// let result = sim.run(&circuit, &ParamResolver::new(), 100).unwrap();
/// assert_eq!(result.repetitions(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct Simulator<B: Backend> {
    config: SimulatorConfig,
    _backend: PhantomData<B>,
}

/// Pure-state simulator; mixtures are sampled per repetition
pub type StateVectorSimulator<T = f32> = Simulator<StateVectorBackend<T>>;

/// Mixed-state simulator; channels are applied exactly
pub type DensityMatrixSimulator<T = f32> = Simulator<DensityMatrixBackend<T>>;

/// Final state and measurements of one unit
type UnitOutput<B> = (<B as Backend>::State, Measurements);

impl<B: Backend> Default for Simulator<B> {
    fn default() -> Self {
        Self {
            config: SimulatorConfig::default(),
            _backend: PhantomData,
        }
    }
}

impl<B: Backend> Simulator<B> {
    /// Create a simulator with the given configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            _backend: PhantomData,
        })
    }

    /// Get the simulator configuration
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    fn master_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn prepare(&self, circuit: &Circuit, order: &QubitOrder, resolver: &ParamResolver) -> Result<PreparedCircuit> {
        PreparedCircuit::new::<B>(circuit, order, resolver, &self.config)
    }

    /// Map over units on the rayon pool or sequentially; output order
    /// follows input order either way
    fn dispatch<I, O, F>(&self, units: Vec<I>, f: F) -> Vec<O>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> O + Send + Sync,
    {
        if self.config.parallel {
            units.into_par_iter().map(f).collect()
        } else {
            units.into_iter().map(f).collect()
        }
    }

    /// Sample `repetitions` runs of `circuit` under one resolver
    ///
    /// # Errors
    /// Returns the first failure, attributed to its repetition.
    pub fn run(&self, circuit: &Circuit, resolver: &ParamResolver, repetitions: usize) -> Result<RunResult> {
        let mut results = self
            .run_sweep(circuit, std::slice::from_ref(resolver), repetitions)?
            .into_results()?;
        results
            .pop()
            .ok_or_else(|| SimulatorError::Execution("sweep returned no result".to_string()))
    }

    /// Sample `repetitions` runs for every resolver
    ///
    /// Results come back in resolver order, each holding its repetitions in
    /// execution order. `repetitions == 0` yields empty but well-formed
    /// results. Circuit-level errors (malformed moments) fail the whole
    /// call; resolution and runtime errors are handled per
    /// [`ErrorPolicy`]. Under fail-fast the returned error is the earliest
    /// failing unit in (resolver, repetition) order.
    pub fn run_sweep(
        &self,
        circuit: &Circuit,
        resolvers: &[ParamResolver],
        repetitions: usize,
    ) -> Result<SweepOutcome> {
        let span = info_span!(
            "sweep",
            backend = B::NAME,
            resolvers = resolvers.len(),
            repetitions
        );
        let _enter = span.enter();

        circuit.validate()?;
        let keys = circuit.measurement_keys();

        let fail_fast = self.config.error_policy == ErrorPolicy::FailFast;
        let mut failures = Vec::new();
        let mut prepared = Vec::with_capacity(resolvers.len());
        for (index, resolver) in resolvers.iter().enumerate() {
            match self.prepare(circuit, &QubitOrder::Default, resolver) {
                Ok(p) => prepared.push(Some(p)),
                Err(err) => {
                    failures.push(err.in_unit(index, None));
                    prepared.push(None);
                    if fail_fast {
                        break;
                    }
                },
            }
        }

        // Seeds are drawn for every unit, prepared or not, so a unit's
        // randomness depends only on its position in the sweep. Under
        // fail-fast, units after the first failed preparation are skipped.
        let mut master = self.master_rng();
        let mut units = Vec::with_capacity(resolvers.len() * repetitions);
        for (index, p) in prepared.iter().enumerate() {
            for repetition in 0..repetitions {
                let seed = master.next_u64();
                if let Some(p) = p {
                    units.push((index, repetition, p, seed));
                }
            }
        }

        let config = &self.config;
        let outcomes = self.dispatch(units, |(index, repetition, p, seed)| {
            let outcome = engine::run_unit::<B>(p, None, seed, config).map(|(_, m)| m);
            (index, repetition, outcome)
        });

        let mut results: Vec<RunResult> = resolvers
            .iter()
            .map(|r| RunResult::new(r.clone(), &keys))
            .collect();
        for (index, repetition, outcome) in outcomes {
            match outcome {
                Ok(measurements) => results[index].push_repetition(measurements),
                Err(err) => failures.push(err.in_unit(index, Some(repetition))),
            }
        }

        failures.sort_by_key(|err| match err {
            SimulatorError::UnitFailed {
                resolver_index,
                repetition,
                ..
            } => (*resolver_index, repetition.map_or(0, |r| r + 1)),
            _ => (usize::MAX, 0),
        });
        if fail_fast && !failures.is_empty() {
            return Err(failures.swap_remove(0));
        }

        info!(
            results = results.len(),
            failures = failures.len(),
            "sweep finished"
        );
        Ok(SweepOutcome { results, failures })
    }

    /// Run a [`Sweep`], expanding it to resolvers first
    pub fn run_study(&self, circuit: &Circuit, sweep: &Sweep, repetitions: usize) -> Result<SweepOutcome> {
        self.run_sweep(circuit, &sweep.resolvers(), repetitions)
    }

    /// Simulate once from the zero state, keeping the final state
    pub fn simulate(
        &self,
        circuit: &Circuit,
        order: &QubitOrder,
        resolver: &ParamResolver,
    ) -> Result<SimulationTrialResult<B::State>> {
        self.simulate_inner(circuit, order, resolver, None)
    }

    /// Simulate once from a given initial state
    ///
    /// `initial` is a basis-state integer or a full tensor in the
    /// simulation's qubit order.
    pub fn simulate_from(
        &self,
        circuit: &Circuit,
        order: &QubitOrder,
        resolver: &ParamResolver,
        initial: impl Into<StateInput<B::Real>>,
    ) -> Result<SimulationTrialResult<B::State>> {
        self.simulate_inner(circuit, order, resolver, Some(initial.into()))
    }

    fn simulate_inner(
        &self,
        circuit: &Circuit,
        order: &QubitOrder,
        resolver: &ParamResolver,
        initial: Option<StateInput<B::Real>>,
    ) -> Result<SimulationTrialResult<B::State>> {
        let prepared = self.prepare(circuit, order, resolver)?;
        let seed = self.master_rng().next_u64();
        let output = engine::run_unit::<B>(&prepared, initial.as_ref(), seed, &self.config)?;
        Ok(trial_result::<B>(&prepared, output))
    }

    /// Simulate once per resolver, keeping every final state
    ///
    /// # Errors
    /// Returns the first failure in resolver order, attributed to its
    /// resolver.
    pub fn simulate_sweep(
        &self,
        circuit: &Circuit,
        order: &QubitOrder,
        resolvers: &[ParamResolver],
    ) -> Result<Vec<SimulationTrialResult<B::State>>> {
        let span = info_span!("simulate_sweep", backend = B::NAME, resolvers = resolvers.len());
        let _enter = span.enter();

        let mut master = self.master_rng();
        let units: Vec<(usize, &ParamResolver, u64)> = resolvers
            .iter()
            .enumerate()
            .map(|(index, resolver)| (index, resolver, master.next_u64()))
            .collect();

        let outcomes = self.dispatch(units, |(index, resolver, seed)| -> Result<SimulationTrialResult<B::State>> {
            let prepared = self.prepare(circuit, order, resolver).map_err(|e| e.in_unit(index, None))?;
            let output = engine::run_unit::<B>(&prepared, None, seed, &self.config)
                .map_err(|e| e.in_unit(index, Some(0)))?;
            Ok(trial_result::<B>(&prepared, output))
        });
        outcomes.into_iter().collect()
    }

    /// Step through the circuit one moment at a time
    ///
    /// Uses the same seed derivation as [`simulate`](Self::simulate), so the
    /// state after the last step equals the state `simulate` returns.
    pub fn simulate_moment_steps(
        &self,
        circuit: &Circuit,
        order: &QubitOrder,
        resolver: &ParamResolver,
    ) -> Result<MomentSteps<B>> {
        let prepared = self.prepare(circuit, order, resolver)?;
        let seed = self.master_rng().next_u64();
        debug!(moments = prepared.num_moments(), "stepping circuit");
        MomentSteps::new(prepared, self.config.clone(), None, seed)
    }
}

fn trial_result<B: Backend>(prepared: &PreparedCircuit, (state, measurements): UnitOutput<B>) -> SimulationTrialResult<B::State> {
    SimulationTrialResult {
        params: prepared.params().clone(),
        measurements,
        qubit_order: prepared.qubit_order().to_vec(),
        final_state: state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qmoment_core::{Operation, Param, Qubit};
    use std::sync::Arc;

    fn x_pow_measured() -> Circuit {
        let q = Qubit::line(0);
        Circuit::from_operations(vec![
            Operation::gate(Arc::new(qmoment_gates::x_pow(Param::symbol("x"))), &[q.clone()]).unwrap(),
            Operation::measure("m", &[q]).unwrap(),
        ])
    }

    fn seeded<B: Backend>(seed: u64) -> Simulator<B> {
        Simulator::new(SimulatorConfig::new().with_seed(seed)).unwrap()
    }

    #[test]
    fn test_simulator_creation() {
        let sim = StateVectorSimulator::<f32>::default();
        assert!(sim.config().parallel);
        assert!(StateVectorSimulator::<f32>::new(SimulatorConfig::new().with_tolerance(2.0)).is_err());
    }

    #[test]
    fn test_sweep_preserves_resolver_order() {
        let sim = seeded::<StateVectorBackend>(3);
        let resolvers = vec![
            ParamResolver::new().with("x", 1.0),
            ParamResolver::new().with("x", 0.0),
            ParamResolver::new().with("x", 1.0),
        ];
        let results = sim.run_sweep(&x_pow_measured(), &resolvers, 5).unwrap().into_results().unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].histogram("m").unwrap()[&1], 5);
        assert_eq!(results[1].histogram("m").unwrap()[&0], 5);
        assert_eq!(results[2].params(), &resolvers[2]);
    }

    #[test]
    fn test_same_seed_parallel_and_sequential_agree() {
        let resolvers = Sweep::linspace("x", 0.0, 1.0, 4).resolvers();
        let parallel = seeded::<StateVectorBackend>(17);
        let sequential: StateVectorSimulator =
            Simulator::new(SimulatorConfig::new().with_seed(17).with_parallel(false)).unwrap();

        let a = parallel.run_sweep(&x_pow_measured(), &resolvers, 50).unwrap();
        let b = sequential.run_sweep(&x_pow_measured(), &resolvers, 50).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unresolved_parameter_fails_fast() {
        let sim = seeded::<StateVectorBackend>(0);
        let err = sim.run(&x_pow_measured(), &ParamResolver::new(), 10).unwrap_err();
        assert_eq!(err.root(), &SimulatorError::UnresolvedParameter { name: "x".into() });
    }

    #[test]
    fn test_collect_per_unit_keeps_siblings() {
        let sim: StateVectorSimulator = Simulator::new(
            SimulatorConfig::new()
                .with_seed(0)
                .with_error_policy(ErrorPolicy::CollectPerUnit),
        )
        .unwrap();
        let resolvers = vec![ParamResolver::new().with("x", 1.0), ParamResolver::new()];
        let outcome = sim.run_sweep(&x_pow_measured(), &resolvers, 4).unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.results[0].repetitions(), 4);
        assert_eq!(outcome.results[1].repetitions(), 0);
        assert!(matches!(
            outcome.failures[0],
            SimulatorError::UnitFailed {
                resolver_index: 1,
                repetition: None,
                ..
            }
        ));
    }

    #[test]
    fn test_fail_fast_reports_earliest_unit() {
        let token = crate::CancellationToken::new();
        token.cancel();
        let sim: StateVectorSimulator =
            Simulator::new(SimulatorConfig::new().with_seed(0).with_cancellation(token)).unwrap();
        let resolvers = vec![ParamResolver::new().with("x", 1.0), ParamResolver::new()];
        let err = sim.run_sweep(&x_pow_measured(), &resolvers, 2).unwrap_err();

        assert!(matches!(
            err,
            SimulatorError::UnitFailed {
                resolver_index: 0,
                repetition: Some(0),
                ..
            }
        ));
        assert_eq!(err.root(), &SimulatorError::Cancelled { moment: 0 });
    }

    #[test]
    fn test_simulate_sweep_one_trial_per_resolver() {
        let sim = seeded::<DensityMatrixBackend<f64>>(1);
        let resolvers = vec![ParamResolver::new().with("x", 0.5), ParamResolver::new().with("x", 1.0)];
        let trials = sim.simulate_sweep(&x_pow_measured(), &QubitOrder::Default, &resolvers).unwrap();

        assert_eq!(trials.len(), 2);
        assert_relative_eq!(trials[0].purity(), 1.0, epsilon = 1e-10);
        assert_eq!(trials[1].measurements["m"], vec![true]);
    }

    #[test]
    fn test_simulate_from_basis_state() {
        let sim = seeded::<StateVectorBackend<f64>>(0);
        let resolver = ParamResolver::new().with("x", 1.0);
        let trial = sim.simulate_from(&x_pow_measured(), &QubitOrder::Default, &resolver, 1u64).unwrap();
        assert_eq!(trial.measurements["m"], vec![false]);
    }
}
