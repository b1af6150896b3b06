//! A layer of qubit-disjoint operations

use crate::operation::Operation;
use crate::{QuantumError, Qubit, Result};
use ahash::AHashSet;
use std::fmt;

/// Operations applied simultaneously; no two share a qubit
///
/// # Example
/// ```
/// use qmoment_core::{Moment, Operation, Qubit};
///
/// let q = Qubit::line_range(2);
/// let moment = Moment::new(vec![
///     Operation::measure("a", &q[..1]).unwrap(),
///     Operation::measure("b", &q[1..]).unwrap(),
/// ])
/// .unwrap();
/// assert_eq!(moment.len(), 2);
///
/// let clash = Moment::new(vec![
///     Operation::measure("a", &q[..1]).unwrap(),
///     Operation::measure("b", &q[..1]).unwrap(),
/// ]);
/// assert!(clash.is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Moment {
    operations: Vec<Operation>,
}

impl Moment {
    /// Build a moment, checking qubit disjointness
    ///
    /// # Errors
    /// Returns `MalformedMoment` (with moment index 0) on overlap.
    pub fn new(operations: Vec<Operation>) -> Result<Self> {
        let moment = Self { operations };
        moment.validate(0)?;
        Ok(moment)
    }

    /// An empty moment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check that no qubit is used twice; `index` is reported in the error
    ///
    /// # Errors
    /// Returns `MalformedMoment` naming the first shared qubit.
    pub fn validate(&self, index: usize) -> Result<()> {
        let mut seen = AHashSet::new();
        for op in &self.operations {
            for q in op.qubits() {
                if !seen.insert(q) {
                    return Err(QuantumError::MalformedMoment {
                        moment: index,
                        qubit: q.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Add an operation if it touches none of this moment's qubits
    ///
    /// # Errors
    /// Returns `MalformedMoment` if a qubit is already in use.
    pub fn push(&mut self, operation: Operation) -> Result<()> {
        if let Some(q) = operation.qubits().iter().find(|q| self.operates_on(q)) {
            return Err(QuantumError::MalformedMoment {
                moment: 0,
                qubit: q.clone(),
            });
        }
        self.operations.push(operation);
        Ok(())
    }

    /// Append an operation already known to be disjoint from this moment
    pub(crate) fn push_disjoint(&mut self, operation: Operation) {
        debug_assert!(operation.qubits().iter().all(|q| !self.operates_on(q)));
        self.operations.push(operation);
    }

    /// Whether any operation in the moment touches `qubit`
    pub fn operates_on(&self, qubit: &Qubit) -> bool {
        self.operations.iter().any(|op| op.qubits().contains(qubit))
    }

    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// All qubits touched by the moment
    pub fn qubits(&self) -> impl Iterator<Item = &Qubit> {
        self.operations.iter().flat_map(|op| op.qubits())
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rejects_overlap() {
        let q = Qubit::line_range(3);
        let mut moment = Moment::empty();
        moment.push(Operation::measure("a", &q[0..2]).unwrap()).unwrap();
        assert!(moment.operates_on(&q[1]));
        assert!(!moment.operates_on(&q[2]));

        let err = moment
            .push(Operation::measure("b", &q[1..3]).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            QuantumError::MalformedMoment {
                moment: 0,
                qubit: q[1].clone()
            }
        );
        assert_eq!(moment.len(), 1);
    }

    #[test]
    fn test_validate_reports_index() {
        let q = Qubit::line(0);
        let moment = Moment {
            operations: vec![
                Operation::measure("a", &[q.clone()]).unwrap(),
                Operation::measure("b", &[q.clone()]).unwrap(),
            ],
        };
        assert_eq!(
            moment.validate(4).unwrap_err(),
            QuantumError::MalformedMoment { moment: 4, qubit: q }
        );
    }

    #[test]
    fn test_display() {
        let q = Qubit::line_range(2);
        let moment = Moment::new(vec![
            Operation::measure("a", &q[..1]).unwrap(),
            Operation::measure("b", &q[1..]).unwrap(),
        ])
        .unwrap();
        assert_eq!(format!("{}", moment), "measure[a](q(0)) and measure[b](q(1))");
        assert_eq!(moment.qubits().count(), 2);
    }
}
