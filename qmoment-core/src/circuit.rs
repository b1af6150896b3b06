//! Quantum circuit representation

use crate::moment::Moment;
use crate::operation::Operation;
use crate::{QuantumError, Qubit, Result};
use std::collections::BTreeSet;
use std::fmt;

/// A quantum circuit: an ordered sequence of moments
///
/// The simulators treat a circuit as read-only input. Moment disjointness is
/// checked on construction, and again by [`Circuit::validate`] when a
/// circuit is handed to a simulator.
///
/// # Example
/// ```
/// use qmoment_core::{Circuit, Operation, Qubit};
///
/// let q = Qubit::line_range(2);
/// let circuit = Circuit::from_operations(vec![
///     Operation::measure("a", &q[..1]).unwrap(),
///     Operation::measure("b", &q[1..]).unwrap(),
///     Operation::measure("c", &q[..1]).unwrap(),
/// ]);
/// assert_eq!(circuit.num_moments(), 2);
/// assert_eq!(circuit.all_qubits().len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    moments: Vec<Moment>,
}

impl Circuit {
    /// Create a circuit from moments
    ///
    /// # Errors
    /// Returns `MalformedMoment` if any moment reuses a qubit.
    pub fn new(moments: Vec<Moment>) -> Result<Self> {
        let circuit = Self { moments };
        circuit.validate()?;
        Ok(circuit)
    }

    /// Pack operations into moments, each going into the earliest moment
    /// after the last one touching any of its qubits
    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> Self {
        let mut moments: Vec<Moment> = Vec::new();
        for op in operations {
            let earliest = moments
                .iter()
                .rposition(|m| op.qubits().iter().any(|q| m.operates_on(q)))
                .map_or(0, |i| i + 1);
            if earliest == moments.len() {
                moments.push(Moment::empty());
            }
            moments[earliest].push_disjoint(op);
        }
        Self { moments }
    }

    /// Append a moment at the end
    ///
    /// # Errors
    /// Returns `MalformedMoment` if the moment reuses a qubit.
    pub fn push_moment(&mut self, moment: Moment) -> Result<()> {
        moment.validate(self.moments.len())?;
        self.moments.push(moment);
        Ok(())
    }

    #[inline]
    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    #[inline]
    pub fn num_moments(&self) -> usize {
        self.moments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Iterate every operation in moment order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.moments.iter().flat_map(|m| m.operations())
    }

    /// Every qubit referenced by any operation
    pub fn all_qubits(&self) -> BTreeSet<Qubit> {
        self.operations().flat_map(|op| op.qubits()).cloned().collect()
    }

    /// Every symbol referenced by any operation
    pub fn symbols(&self) -> BTreeSet<String> {
        self.operations().flat_map(Operation::symbols).collect()
    }

    /// Measurement keys in order of first appearance
    pub fn measurement_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for key in self.operations().filter_map(Operation::measurement_key) {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }

    /// Whether the circuit contains a measurement
    pub fn has_measurements(&self) -> bool {
        self.operations().any(Operation::is_measurement)
    }

    /// Validate moment disjointness
    ///
    /// # Errors
    /// Returns `MalformedMoment` naming the first offending moment and qubit.
    pub fn validate(&self) -> Result<()> {
        self.moments
            .iter()
            .enumerate()
            .try_for_each(|(i, m)| m.validate(i))
    }

    /// Check that a measurement key reused across operations always
    /// measures the same number of qubits
    ///
    /// # Errors
    /// Returns a validation error on a key reused with a different arity.
    pub fn validate_measurement_keys(&self) -> Result<()> {
        let mut arity: Vec<(&str, usize)> = Vec::new();
        for op in self.operations().filter(|op| op.is_measurement()) {
            let key = op.name();
            match arity.iter().find(|(k, _)| *k == key) {
                Some(&(_, n)) if n != op.num_qubits() => {
                    return Err(QuantumError::ValidationError(format!(
                        "Measurement key '{}' used with {} and {} qubits",
                        key,
                        n,
                        op.num_qubits()
                    )));
                },
                Some(_) => {},
                None => arity.push((key, op.num_qubits())),
            }
        }
        Ok(())
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, moment) in self.moments.iter().enumerate() {
            writeln!(f, "{:>3}: {}", i, moment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(key: &str, qubits: &[Qubit]) -> Operation {
        Operation::measure(key, qubits).unwrap()
    }

    #[test]
    fn test_from_operations_packs_earliest() {
        let q = Qubit::line_range(3);
        let circuit = Circuit::from_operations(vec![
            measure("a", &q[0..2]),
            measure("b", &q[2..3]),
            measure("c", &q[1..2]),
            measure("d", &q[2..3]),
        ]);
        assert_eq!(circuit.num_moments(), 2);
        assert_eq!(circuit.moments()[0].len(), 2);
        assert_eq!(circuit.moments()[1].len(), 2);
    }

    #[test]
    fn test_from_operations_does_not_reorder_past_dependency() {
        // "c" touches q0 only but must follow "b", which comes after "a" on q1
        let q = Qubit::line_range(2);
        let circuit = Circuit::from_operations(vec![
            measure("a", &q[1..2]),
            measure("b", &q[0..2]),
            measure("c", &q[0..1]),
        ]);
        assert_eq!(circuit.num_moments(), 3);
    }

    #[test]
    fn test_new_validates_moments() {
        let q = Qubit::line(0);
        let good = Moment::new(vec![measure("a", &[q.clone()])]).unwrap();
        let mut circuit = Circuit::new(vec![good.clone()]).unwrap();
        circuit.push_moment(good).unwrap();
        assert_eq!(circuit.num_moments(), 2);
        assert!(circuit.validate().is_ok());
    }

    #[test]
    fn test_measurement_keys_in_order() {
        let q = Qubit::line_range(2);
        let circuit = Circuit::from_operations(vec![
            measure("z", &q[..1]),
            measure("a", &q[1..]),
            measure("z", &q[..1]),
        ]);
        assert_eq!(circuit.measurement_keys(), vec!["z".to_string(), "a".to_string()]);
        assert!(circuit.has_measurements());
        assert!(circuit.validate_measurement_keys().is_ok());
    }

    #[test]
    fn test_measurement_key_arity_mismatch() {
        let q = Qubit::line_range(2);
        let circuit = Circuit::from_operations(vec![measure("m", &q[..1]), measure("m", &q)]);
        assert!(circuit.validate_measurement_keys().is_err());
    }

    #[test]
    fn test_empty_circuit() {
        let circuit = Circuit::default();
        assert!(circuit.is_empty());
        assert!(circuit.all_qubits().is_empty());
        assert!(circuit.symbols().is_empty());
    }
}
