//! Moment-by-moment driving of one simulation unit

use crate::backend::Backend;
use crate::config::SimulatorConfig;
use crate::error::{Result, SimulatorError};
use crate::prepared::{PreparedCircuit, PreparedOp};
use qmoment_core::ResolvedOp;
use qmoment_state::{QuantumState, StateInput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use tracing::trace;

/// Measured bits per key; bit `i` belongs to the key's `i`-th qubit
pub type Measurements = BTreeMap<String, Vec<bool>>;

/// Apply one moment and return the measurements it recorded
///
/// Operations in a moment act on disjoint axes, so they are applied in
/// their listed order. A key measured twice in one moment keeps the later
/// record.
pub(crate) fn run_moment<B: Backend>(
    state: &mut B::State,
    index: usize,
    ops: &[PreparedOp],
    rng: &mut StdRng,
    config: &SimulatorConfig,
) -> Result<Measurements> {
    if config.is_cancelled() {
        return Err(SimulatorError::Cancelled { moment: index });
    }
    trace!(moment = index, operations = ops.len(), "applying moment");

    let mut measurements = Measurements::new();
    for prepared in ops {
        let bits = B::apply(state, &prepared.op, &prepared.axes, rng, config)?;
        if let (Some(mut bits), ResolvedOp::Measure(spec)) = (bits, &prepared.op) {
            for (i, bit) in bits.iter_mut().enumerate() {
                *bit ^= spec.inverts(i);
            }
            measurements.insert(spec.key.clone(), bits);
        }
    }

    if config.check_invariants {
        B::check_invariants(state, index, config)?;
    }
    Ok(measurements)
}

/// Fresh state for a unit: the zero state, or `initial` if given
pub(crate) fn initial_state<B: Backend>(
    num_qubits: usize,
    initial: Option<&StateInput<B::Real>>,
) -> Result<B::State> {
    let mut state = B::initial_state(num_qubits)?;
    if let Some(input) = initial {
        state.set_from(input.clone())?;
    }
    Ok(state)
}

/// Run every moment of `prepared` with its own seeded random source
///
/// Returns the final state and the measurements of the whole run; a key
/// measured in several moments keeps its last record.
pub(crate) fn run_unit<B: Backend>(
    prepared: &PreparedCircuit,
    initial: Option<&StateInput<B::Real>>,
    seed: u64,
    config: &SimulatorConfig,
) -> Result<(B::State, Measurements)> {
    let mut state = initial_state::<B>(prepared.num_qubits(), initial)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut measurements = Measurements::new();
    for (index, ops) in prepared.moments().iter().enumerate() {
        measurements.extend(run_moment::<B>(&mut state, index, ops, &mut rng, config)?);
    }
    Ok((state, measurements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DensityMatrixBackend, StateVectorBackend};
    use crate::cancellation::CancellationToken;
    use qmoment_core::noise::BitFlip;
    use qmoment_core::{Circuit, MeasurementSpec, Operation, ParamResolver, Qubit, QubitOrder};
    use std::sync::Arc;

    fn flip_and_measure(inverted: bool) -> Circuit {
        let q = Qubit::line(0);
        let spec = MeasurementSpec {
            key: "m".into(),
            invert_mask: vec![inverted],
        };
        Circuit::from_operations(vec![
            Operation::channel(Arc::new(BitFlip::new(1.0)), &[q.clone()]).unwrap(),
            Operation::measure_with(spec, &[q]).unwrap(),
        ])
    }

    fn prepare<B: Backend>(circuit: &Circuit, config: &SimulatorConfig) -> PreparedCircuit {
        PreparedCircuit::new::<B>(circuit, &QubitOrder::Default, &ParamResolver::new(), config).unwrap()
    }

    #[test]
    fn test_invert_mask_applied() {
        let config = SimulatorConfig::default();
        let plain = prepare::<StateVectorBackend>(&flip_and_measure(false), &config);
        let (_, m) = run_unit::<StateVectorBackend>(&plain, None, 1, &config).unwrap();
        assert_eq!(m["m"], vec![true]);

        let inverted = prepare::<StateVectorBackend>(&flip_and_measure(true), &config);
        let (_, m) = run_unit::<StateVectorBackend>(&inverted, None, 1, &config).unwrap();
        assert_eq!(m["m"], vec![false]);
    }

    #[test]
    fn test_initial_state_injected() {
        let config = SimulatorConfig::default();
        let prepared = prepare::<DensityMatrixBackend>(&flip_and_measure(false), &config);
        let (rho, m) =
            run_unit::<DensityMatrixBackend>(&prepared, Some(&StateInput::Basis(1)), 3, &config).unwrap();
        assert_eq!(m["m"], vec![false]);
        assert_eq!(rho.probabilities()[0], 1.0);
    }

    #[test]
    fn test_same_seed_same_outcomes() {
        let q = Qubit::line_range(3);
        let mut ops: Vec<Operation> = q
            .iter()
            .map(|qubit| Operation::gate(Arc::new(qmoment_gates::h()), &[qubit.clone()]).unwrap())
            .collect();
        ops.push(Operation::measure("m", &q).unwrap());
        let circuit = Circuit::from_operations(ops);

        let config = SimulatorConfig::default();
        let prepared = prepare::<StateVectorBackend>(&circuit, &config);
        let a = run_unit::<StateVectorBackend>(&prepared, None, 99, &config).unwrap().1;
        let b = run_unit::<StateVectorBackend>(&prepared, None, 99, &config).unwrap().1;
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancelled_before_first_moment() {
        let token = CancellationToken::new();
        token.cancel();
        let config = SimulatorConfig::default().with_cancellation(token);
        let prepared = prepare::<StateVectorBackend>(&flip_and_measure(false), &config);
        let err = run_unit::<StateVectorBackend>(&prepared, None, 0, &config).unwrap_err();
        assert_eq!(err, SimulatorError::Cancelled { moment: 0 });
    }
}
