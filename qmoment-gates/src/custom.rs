//! Gates defined by an explicit matrix

use qmoment_core::{Gate, Matrix, ParamResolver, QuantumError, Result};

/// A fixed unitary supplied by the caller
///
/// # Example
/// ```
/// use qmoment_core::{Complex64, Gate, Matrix};
/// use qmoment_gates::MatrixGate;
///
/// let i = Complex64::new(0.0, 1.0);
/// let o = Complex64::new(0.0, 0.0);
/// let gate = MatrixGate::new("iX", Matrix::from_2x2(o, i, i, o)).unwrap();
/// assert_eq!(gate.num_qubits(), 1);
///
/// let not_unitary = Matrix::from_2x2(i, i, o, o);
/// assert!(MatrixGate::new("bad", not_unitary).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MatrixGate {
    name: String,
    matrix: Matrix,
}

impl MatrixGate {
    /// Wrap a matrix, checking unitarity
    ///
    /// # Errors
    /// Returns `InvalidMatrix` if `U†U ≠ I`.
    pub fn new(name: impl Into<String>, matrix: Matrix) -> Result<Self> {
        let name = name.into();
        if !matrix.is_unitary(1e-8) {
            return Err(QuantumError::InvalidMatrix(format!("{} is not unitary", name)));
        }
        Ok(Self { name, matrix })
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }
}

impl Gate for MatrixGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.matrix.num_qubits()
    }

    fn unitary(&self, _resolver: &ParamResolver) -> Result<Matrix> {
        Ok(self.matrix.clone())
    }
}

/// Identity on any number of qubits
///
/// Useful to pull otherwise idle qubits into a simulation's register.
#[derive(Debug, Clone, Copy)]
pub struct IdentityGate {
    num_qubits: usize,
}

impl IdentityGate {
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits }
    }
}

impl Gate for IdentityGate {
    fn name(&self) -> &str {
        "I"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn unitary(&self, _resolver: &ParamResolver) -> Result<Matrix> {
        Ok(Matrix::identity(1 << self.num_qubits))
    }
}
