//! Dense square complex matrices for gates and Kraus operators

use crate::{QuantumError, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A `2^k × 2^k` complex matrix stored in row-major order
///
/// Row and column indices use the big-endian convention of the target
/// qubits: the first target qubit is the most significant bit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    dimension: usize,
    data: Vec<Complex64>,
}

impl Matrix {
    /// Create a matrix from row-major data
    ///
    /// # Errors
    /// Returns error if `dimension` is not a power of two or the data length
    /// is not `dimension²`.
    pub fn new(data: Vec<Complex64>, dimension: usize) -> Result<Self> {
        if dimension == 0 || !dimension.is_power_of_two() {
            return Err(QuantumError::InvalidMatrix(format!(
                "dimension must be a power of 2, got {}",
                dimension
            )));
        }
        if data.len() != dimension * dimension {
            return Err(QuantumError::InvalidMatrix(format!(
                "matrix size {} doesn't match dimension {}×{}",
                data.len(),
                dimension,
                dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Create a matrix from row slices
    ///
    /// # Errors
    /// Same as [`Matrix::new`], plus ragged rows.
    pub fn from_rows(rows: &[&[Complex64]]) -> Result<Self> {
        let dimension = rows.len();
        if rows.iter().any(|row| row.len() != dimension) {
            return Err(QuantumError::InvalidMatrix("rows must form a square".to_string()));
        }
        Self::new(rows.iter().flat_map(|row| row.iter().copied()).collect(), dimension)
    }

    /// Matrix from a constant row array
    ///
    /// # Panics
    /// Panics if `N` is not a power of two.
    pub fn from_array<const N: usize>(rows: &[[Complex64; N]; N]) -> Self {
        assert!(N.is_power_of_two(), "matrix dimension must be a power of 2");
        Self {
            dimension: N,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    /// 2×2 matrix from its four entries
    pub fn from_2x2(m00: Complex64, m01: Complex64, m10: Complex64, m11: Complex64) -> Self {
        Self {
            dimension: 2,
            data: vec![m00, m01, m10, m11],
        }
    }

    /// Identity of the given dimension
    pub fn identity(dimension: usize) -> Self {
        let mut data = vec![ZERO; dimension * dimension];
        for i in 0..dimension {
            data[i * dimension + i] = ONE;
        }
        Self { dimension, data }
    }

    /// Zero matrix of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            data: vec![ZERO; dimension * dimension],
        }
    }

    /// Diagonal matrix
    ///
    /// # Errors
    /// Returns error if the length is not a power of two.
    pub fn diagonal(entries: &[Complex64]) -> Result<Self> {
        if entries.is_empty() || !entries.len().is_power_of_two() {
            return Err(QuantumError::InvalidMatrix(format!(
                "diagonal length must be a power of 2, got {}",
                entries.len()
            )));
        }
        let mut m = Self::zeros(entries.len());
        for (i, &e) in entries.iter().enumerate() {
            m.data[i * m.dimension + i] = e;
        }
        Ok(m)
    }

    /// Side length of the matrix
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of qubits the matrix acts on
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.dimension.trailing_zeros() as usize
    }

    /// Element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dimension + col]
    }

    /// Row-major data
    #[inline]
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Self {
        let d = self.dimension;
        let mut data = vec![ZERO; d * d];
        for i in 0..d {
            for j in 0..d {
                data[j * d + i] = self.data[i * d + j].conj();
            }
        }
        Self { dimension: d, data }
    }

    /// Element-wise complex conjugate
    pub fn conj(&self) -> Self {
        Self {
            dimension: self.dimension,
            data: self.data.iter().map(|z| z.conj()).collect(),
        }
    }

    /// Multiply every element by a scalar
    pub fn scale(&self, factor: Complex64) -> Self {
        Self {
            dimension: self.dimension,
            data: self.data.iter().map(|&z| z * factor).collect(),
        }
    }

    /// Matrix product `self · rhs`
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    pub fn matmul(&self, rhs: &Matrix) -> Self {
        assert_eq!(self.dimension, rhs.dimension, "matrix dimension mismatch");
        let d = self.dimension;
        let mut data = vec![ZERO; d * d];
        for i in 0..d {
            for k in 0..d {
                let a = self.data[i * d + k];
                if a == ZERO {
                    continue;
                }
                for j in 0..d {
                    data[i * d + j] += a * rhs.data[k * d + j];
                }
            }
        }
        Self { dimension: d, data }
    }

    /// Kronecker product `self ⊗ rhs`; `self` acts on the leading qubits
    pub fn kron(&self, rhs: &Matrix) -> Self {
        let (a, b) = (self.dimension, rhs.dimension);
        let d = a * b;
        let mut data = vec![ZERO; d * d];
        for i in 0..a {
            for j in 0..a {
                let x = self.data[i * a + j];
                for k in 0..b {
                    for l in 0..b {
                        data[(i * b + k) * d + (j * b + l)] = x * rhs.data[k * b + l];
                    }
                }
            }
        }
        Self { dimension: d, data }
    }

    /// Element-wise closeness
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.dimension == other.dimension
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }

    /// Whether `U†U = I` within tolerance
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.adjoint()
            .matmul(self)
            .approx_eq(&Self::identity(self.dimension), tolerance)
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.dimension, rhs.dimension, "matrix dimension mismatch");
        Matrix {
            dimension: self.dimension,
            data: self.data.iter().zip(&rhs.data).map(|(a, b)| a + b).collect(),
        }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        self.matmul(rhs)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.dimension {
            write!(f, "[")?;
            for j in 0..self.dimension {
                if j > 0 {
                    write!(f, ", ")?;
                }
                let z = self.get(i, j);
                write!(f, "{:.3}{:+.3}i", z.re, z.im)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_new_rejects_bad_shapes() {
        assert!(Matrix::new(vec![ONE; 9], 3).is_err());
        assert!(Matrix::new(vec![ONE; 3], 2).is_err());
        assert!(Matrix::new(vec![ONE; 4], 2).is_ok());
    }

    #[test]
    fn test_identity_is_unitary() {
        let id = Matrix::identity(4);
        assert!(id.is_unitary(1e-12));
        assert_eq!(id.num_qubits(), 2);
    }

    #[test]
    fn test_adjoint_and_conj() {
        let m = Matrix::from_rows(&[&[c(1.0, 0.0), c(0.0, 2.0)], &[c(3.0, -1.0), c(0.0, 0.0)]]).unwrap();
        let adj = m.adjoint();
        assert_eq!(adj.get(0, 1), c(3.0, 1.0));
        assert_eq!(adj.get(1, 0), c(0.0, -2.0));
        assert_eq!(m.conj().get(0, 1), c(0.0, -2.0));
    }

    #[test]
    fn test_kron_layering() {
        // X ⊗ I maps |00⟩ to |10⟩: first factor is the most significant bit
        let x = Matrix::from_2x2(ZERO, ONE, ONE, ZERO);
        let xi = x.kron(&Matrix::identity(2));
        assert_eq!(xi.get(2, 0), ONE);
        assert_eq!(xi.get(1, 0), ZERO);
    }

    #[test]
    fn test_non_unitary_detected() {
        let m = Matrix::from_rows(&[&[ONE, ONE], &[ZERO, ONE]]).unwrap();
        assert!(!m.is_unitary(1e-9));
    }

    #[test]
    fn test_diagonal() {
        let d = Matrix::diagonal(&[ONE, c(0.0, 1.0)]).unwrap();
        assert_eq!(d.get(1, 1), c(0.0, 1.0));
        assert!(d.is_unitary(1e-12));
        assert!(Matrix::diagonal(&[ONE; 3]).is_err());
    }
}
