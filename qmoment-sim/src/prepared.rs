//! Circuits resolved against one parameter assignment and one qubit order

use crate::backend::Backend;
use crate::config::SimulatorConfig;
use crate::error::Result;
use qmoment_core::{qubit_map, Circuit, ParamResolver, Qubit, QubitOrder, ResolvedOp};
use smallvec::SmallVec;
use tracing::debug;

/// One operation in its concrete form, addressed by tensor axes
#[derive(Debug, Clone)]
pub struct PreparedOp {
    pub name: String,
    pub op: ResolvedOp,
    pub axes: SmallVec<[usize; 2]>,
}

/// A circuit ready to run: every parameter substituted, every qubit mapped
/// to its axis
///
/// Preparation is where input errors surface. A missing symbol, a moment
/// with overlapping qubits, a duplicate in the qubit order or an operation
/// the backend cannot apply all fail here, before any state is allocated.
#[derive(Debug, Clone)]
pub struct PreparedCircuit {
    qubit_order: Vec<Qubit>,
    moments: Vec<Vec<PreparedOp>>,
    measurement_keys: Vec<String>,
    params: ParamResolver,
}

impl PreparedCircuit {
    /// Resolve `circuit` for backend `B`
    pub fn new<B: Backend>(
        circuit: &Circuit,
        order: &QubitOrder,
        resolver: &ParamResolver,
        config: &SimulatorConfig,
    ) -> Result<Self> {
        circuit.validate()?;
        circuit.validate_measurement_keys()?;

        let used = circuit.all_qubits();
        let qubit_order = order.order_for(&used)?;
        let axes_of = qubit_map(&qubit_order);

        let mut moments = Vec::with_capacity(circuit.num_moments());
        for moment in circuit.moments() {
            let mut ops = Vec::with_capacity(moment.len());
            for operation in moment.operations() {
                let op = operation.resolve(resolver)?;
                B::check_supported(operation.name(), &op, config)?;
                // Every operation qubit is in the order, so the lookup is total.
                let axes = operation
                    .qubits()
                    .iter()
                    .filter_map(|q| axes_of.get(q).copied())
                    .collect();
                ops.push(PreparedOp {
                    name: operation.name().to_string(),
                    op,
                    axes,
                });
            }
            moments.push(ops);
        }

        debug!(
            backend = B::NAME,
            num_qubits = qubit_order.len(),
            num_moments = moments.len(),
            params = %resolver,
            "prepared circuit"
        );

        Ok(Self {
            qubit_order,
            moments,
            measurement_keys: circuit.measurement_keys(),
            params: resolver.clone(),
        })
    }

    /// Canonical qubit order; position = tensor axis
    pub fn qubit_order(&self) -> &[Qubit] {
        &self.qubit_order
    }

    pub fn num_qubits(&self) -> usize {
        self.qubit_order.len()
    }

    pub fn moments(&self) -> &[Vec<PreparedOp>] {
        &self.moments
    }

    pub fn num_moments(&self) -> usize {
        self.moments.len()
    }

    /// Measurement keys in order of first appearance
    pub fn measurement_keys(&self) -> &[String] {
        &self.measurement_keys
    }

    pub fn params(&self) -> &ParamResolver {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DensityMatrixBackend, StateVectorBackend};
    use crate::error::SimulatorError;
    use qmoment_core::noise::AmplitudeDamping;
    use qmoment_core::{Moment, Operation};
    use std::sync::Arc;

    fn damping_circuit() -> Circuit {
        let q = Qubit::line_range(2);
        let damp = Operation::channel(Arc::new(AmplitudeDamping::new(0.1)), &q[1..]).unwrap();
        let measure = Operation::measure("m", &q).unwrap();
        Circuit::new(vec![Moment::new(vec![damp]).unwrap(), Moment::new(vec![measure]).unwrap()]).unwrap()
    }

    #[test]
    fn test_axes_follow_order() {
        let order = QubitOrder::explicit(vec![Qubit::line(1), Qubit::line(0)]);
        let prepared = PreparedCircuit::new::<DensityMatrixBackend>(
            &damping_circuit(),
            &order,
            &ParamResolver::new(),
            &SimulatorConfig::default(),
        )
        .unwrap();

        assert_eq!(prepared.qubit_order(), &[Qubit::line(1), Qubit::line(0)]);
        assert_eq!(prepared.moments()[0][0].axes.as_slice(), &[0]);
        assert_eq!(prepared.moments()[1][0].axes.as_slice(), &[1, 0]);
        assert_eq!(prepared.measurement_keys(), &["m".to_string()]);
    }

    #[test]
    fn test_state_vector_rejects_channel_at_preparation() {
        let err = PreparedCircuit::new::<StateVectorBackend>(
            &damping_circuit(),
            &QubitOrder::Default,
            &ParamResolver::new(),
            &SimulatorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SimulatorError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_duplicate_order_rejected() {
        let order = QubitOrder::explicit(vec![Qubit::line(0), Qubit::line(0)]);
        let err = PreparedCircuit::new::<DensityMatrixBackend>(
            &damping_circuit(),
            &order,
            &ParamResolver::new(),
            &SimulatorConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, SimulatorError::InvalidOrderingRequest(Qubit::line(0)));
    }
}
