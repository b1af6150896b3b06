//! Caller-supplied states

use crate::error::{Result, StateError};
use crate::precision::Real;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// A replacement state: a basis-state integer or a full tensor
///
/// `Basis(i)` uses the big-endian index convention of the simulation's
/// qubit order, so `Basis(2)` on two qubits is |10⟩.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StateInput<T: Real> {
    /// Computational basis state with this index
    Basis(u64),
    /// `2^n` amplitudes
    Vector(Vec<Complex<T>>),
    /// `2^n × 2^n` density matrix, row-major
    Matrix(Vec<Complex<T>>),
}

impl<T: Real> From<u64> for StateInput<T> {
    fn from(index: u64) -> Self {
        Self::Basis(index)
    }
}

/// A simulation state that can be overwritten from a [`StateInput`]
pub trait QuantumState<T: Real>: Clone + Send {
    /// Number of qubits (tensor axes) in the register
    fn num_qubits(&self) -> usize;

    /// Replace the held state, keeping the qubit count
    ///
    /// # Errors
    /// Returns error if the input has the wrong size, is not normalized, or
    /// cannot be represented (e.g. a mixed state in a state vector).
    fn set_from(&mut self, input: StateInput<T>) -> Result<()>;
}

/// Check that a basis index fits in `num_qubits`
pub(crate) fn check_basis(index: u64, num_qubits: usize) -> Result<usize> {
    let fits = num_qubits >= 64 || index < (1u64 << num_qubits);
    match usize::try_from(index) {
        Ok(i) if fits => Ok(i),
        _ => Err(StateError::InvalidBasisState { index, num_qubits }),
    }
}

/// Check that every axis is in range and none repeats
pub(crate) fn check_axes(axes: &[usize], num_qubits: usize) -> Result<()> {
    for (i, &axis) in axes.iter().enumerate() {
        if axis >= num_qubits || axes[..i].contains(&axis) {
            return Err(StateError::InvalidQubitIndex {
                index: axis,
                num_qubits,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_basis() {
        assert_eq!(check_basis(3, 2).unwrap(), 3);
        assert!(matches!(
            check_basis(4, 2),
            Err(StateError::InvalidBasisState { index: 4, num_qubits: 2 })
        ));
    }

    #[test]
    fn test_check_axes() {
        assert!(check_axes(&[0, 2], 3).is_ok());
        assert!(check_axes(&[3], 3).is_err());
        assert!(check_axes(&[1, 1], 3).is_err());
    }

    #[test]
    fn test_saved_states_load_back() {
        use crate::{DensityMatrix, StateVector};

        let input: StateInput<f64> = StateInput::Vector(vec![Complex::new(0.6, 0.0), Complex::new(0.0, 0.8)]);
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(serde_json::from_str::<StateInput<f64>>(&json).unwrap(), input);

        let state = StateVector::<f32>::from_basis(2, 3).unwrap();
        let back: StateVector<f32> = serde_json::from_str(&serde_json::to_string(&state).unwrap()).unwrap();
        assert_eq!(back, state);

        let rho = DensityMatrix::<f64>::maximally_mixed(1).unwrap();
        let back: DensityMatrix<f64> = serde_json::from_str(&serde_json::to_string(&rho).unwrap()).unwrap();
        assert_eq!(back, rho);
    }

    #[test]
    fn test_from_integer() {
        let input: StateInput<f32> = 5u64.into();
        assert_eq!(input, StateInput::Basis(5));
    }
}
