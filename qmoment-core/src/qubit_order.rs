//! Canonical qubit ordering
//!
//! The canonical order fixes which tensor axis each qubit occupies, and so
//! how amplitudes are indexed: the first qubit in the order is the most
//! significant bit of a basis-state index.

use crate::{QuantumError, Qubit, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A request for the axis order of a simulation
///
/// # Example
/// ```
/// use qmoment_core::{QubitOrder, Qubit};
///
/// let used = [Qubit::line(2), Qubit::line(0), Qubit::line(1)];
/// let order = QubitOrder::explicit(vec![Qubit::line(1)]).order_for(used.iter()).unwrap();
/// assert_eq!(order, vec![Qubit::line(1), Qubit::line(0), Qubit::line(2)]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QubitOrder {
    /// Ascending order of qubit identities
    #[default]
    Default,
    /// These qubits first, in this order; remaining qubits follow ascending
    Explicit(Vec<Qubit>),
}

impl QubitOrder {
    pub fn explicit(qubits: Vec<Qubit>) -> Self {
        Self::Explicit(qubits)
    }

    /// Produce the canonical sequence for the qubits a circuit uses
    ///
    /// Requested qubits keep their relative order and come first, including
    /// ones the circuit never touches; each still occupies an axis.
    ///
    /// # Errors
    /// Returns `InvalidOrderingRequest` if the request lists a qubit twice.
    pub fn order_for<'a>(&self, used: impl IntoIterator<Item = &'a Qubit>) -> Result<Vec<Qubit>> {
        let used: BTreeSet<&Qubit> = used.into_iter().collect();
        match self {
            Self::Default => Ok(used.into_iter().cloned().collect()),
            Self::Explicit(requested) => {
                let mut seen = BTreeSet::new();
                for q in requested {
                    if !seen.insert(q) {
                        return Err(QuantumError::InvalidOrderingRequest(q.clone()));
                    }
                }
                let mut order = requested.clone();
                order.extend(used.into_iter().filter(|q| !seen.contains(q)).cloned());
                Ok(order)
            },
        }
    }
}

impl From<Vec<Qubit>> for QubitOrder {
    fn from(qubits: Vec<Qubit>) -> Self {
        Self::Explicit(qubits)
    }
}

/// Mapping from each qubit to its tensor axis
pub fn qubit_map(order: &[Qubit]) -> AHashMap<Qubit, usize> {
    order.iter().cloned().enumerate().map(|(i, q)| (q, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ascending() {
        let used = vec![Qubit::named("b"), Qubit::line(3), Qubit::named("a"), Qubit::line(0)];
        let order = QubitOrder::Default.order_for(&used).unwrap();
        assert_eq!(
            order,
            vec![Qubit::line(0), Qubit::line(3), Qubit::named("a"), Qubit::named("b")]
        );
    }

    #[test]
    fn test_explicit_superset_keeps_extra_axes() {
        let used = vec![Qubit::line(0)];
        let order = QubitOrder::explicit(vec![Qubit::line(5), Qubit::line(0)])
            .order_for(&used)
            .unwrap();
        assert_eq!(order, vec![Qubit::line(5), Qubit::line(0)]);
    }

    #[test]
    fn test_duplicate_request_rejected() {
        let used = vec![Qubit::line(0)];
        let err = QubitOrder::explicit(vec![Qubit::line(1), Qubit::line(1)])
            .order_for(&used)
            .unwrap_err();
        assert_eq!(err, QuantumError::InvalidOrderingRequest(Qubit::line(1)));
    }

    #[test]
    fn test_each_used_qubit_exactly_once() {
        let used = vec![Qubit::line(2), Qubit::line(1), Qubit::line(2)];
        let order = QubitOrder::explicit(vec![Qubit::line(2)]).order_for(&used).unwrap();
        assert_eq!(order, vec![Qubit::line(2), Qubit::line(1)]);
    }

    #[test]
    fn test_qubit_map() {
        let order = vec![Qubit::named("flip"), Qubit::named("stay")];
        let map = qubit_map(&order);
        assert_eq!(map[&Qubit::named("flip")], 0);
        assert_eq!(map[&Qubit::named("stay")], 1);
    }
}
