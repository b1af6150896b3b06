//! Density matrix representation for mixed quantum states
//!
//! A density matrix ρ is a positive semi-definite, Hermitian matrix with
//! Tr(ρ) = 1. For pure states ρ = |ψ⟩⟨ψ|; for mixed states
//! ρ = Σᵢ pᵢ |ψᵢ⟩⟨ψᵢ|.
//!
//! The `2^n × 2^n` matrix is stored row-major, which is exactly a tensor
//! over `2n` axes: the row axes `0..n` followed by the column axes `n..2n`.
//! Channels therefore reuse the state-vector kernel, contracting `K` on the
//! row axes and `K*` on the column axes.
//!
//! # Example
//!
//! ```
//! use qmoment_state::DensityMatrix;
//!
//! let mixed = DensityMatrix::<f64>::maximally_mixed(1).unwrap();
//! assert!((mixed.purity() - 0.5).abs() < 1e-10);
//! assert!((mixed.trace() - 1.0).abs() < 1e-10);
//! ```

use crate::error::{Result, StateError};
use crate::input::{check_axes, check_basis, QuantumState, StateInput};
use crate::kernel;
use crate::precision::{cast_matrix, cast_matrix_conj, widen, Real};
use crate::state_vector::StateVector;
use nalgebra::{Complex as NaComplex, DMatrix};
use num_complex::Complex;
use qmoment_core::Matrix;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest register a density matrix will allocate
pub const MAX_QUBITS: usize = 15;

/// Density matrix of an `n`-qubit register
///
/// Memory usage: O(4^n) complex numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityMatrix<T: Real = f32> {
    num_qubits: usize,
    data: Vec<Complex<T>>,
}

impl<T: Real> DensityMatrix<T> {
    /// Create a density matrix initialized to |0...0⟩⟨0...0|
    ///
    /// # Errors
    /// Returns error if `num_qubits` exceeds [`MAX_QUBITS`].
    pub fn new(num_qubits: usize) -> Result<Self> {
        Self::from_basis(num_qubits, 0)
    }

    /// |i⟩⟨i| for a big-endian basis index
    ///
    /// # Errors
    /// Returns error if the index does not fit or the register is too large.
    pub fn from_basis(num_qubits: usize, index: u64) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::AllocationError { num_qubits });
        }
        let i = check_basis(index, num_qubits)?;
        let dimension = 1usize << num_qubits;
        let mut data = vec![Complex::new(T::zero(), T::zero()); dimension * dimension];
        data[i * dimension + i] = Complex::new(T::one(), T::zero());
        Ok(Self { num_qubits, data })
    }

    /// ρ = |ψ⟩⟨ψ|
    pub fn from_state_vector(state: &StateVector<T>) -> Self {
        let amplitudes = state.amplitudes();
        let dimension = amplitudes.len();
        let mut data = Vec::with_capacity(dimension * dimension);
        for a in amplitudes {
            for b in amplitudes {
                data.push(*a * b.conj());
            }
        }
        Self {
            num_qubits: state.num_qubits(),
            data,
        }
    }

    /// Create from row-major entries, checking that they form a physical state
    ///
    /// Trace and Hermiticity are checked within the square root of the
    /// precision's default tolerance, then restored exactly by taking the
    /// Hermitian part and dividing by the trace. Eigenvalues must be no
    /// lower than minus the default tolerance.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` on a size mismatch and `NotPhysical` if
    /// the matrix is not a density matrix.
    pub fn from_matrix(num_qubits: usize, data: Vec<Complex<T>>) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::AllocationError { num_qubits });
        }
        let dimension = 1usize << num_qubits;
        if data.len() != dimension * dimension {
            return Err(StateError::DimensionMismatch {
                expected: dimension * dimension,
                actual: data.len(),
            });
        }
        let mut rho = Self { num_qubits, data };
        let slack = T::DEFAULT_TOLERANCE.sqrt();
        let trace_error = (rho.trace() - 1.0).abs();
        if trace_error > slack {
            return Err(StateError::NotPhysical {
                quantity: "trace".to_string(),
                deviation: trace_error,
            });
        }
        let hermiticity = rho.hermiticity_error();
        if hermiticity > slack {
            return Err(StateError::NotPhysical {
                quantity: "hermiticity".to_string(),
                deviation: hermiticity,
            });
        }
        rho.renormalize();
        if let Some(&smallest) = rho.eigenvalues().first() {
            if smallest < -T::DEFAULT_TOLERANCE {
                return Err(StateError::NotPhysical {
                    quantity: "smallest eigenvalue".to_string(),
                    deviation: -smallest,
                });
            }
        }
        Ok(rho)
    }

    /// Replace ρ by (ρ + ρ†) / (2 Tr ρ)
    fn renormalize(&mut self) {
        let d = self.dimension();
        let scale = T::of(0.5 / self.trace());
        for i in 0..d {
            for j in i..d {
                let upper = self.data[i * d + j];
                let lower = self.data[j * d + i];
                let mean = (upper + lower.conj()) * scale;
                self.data[i * d + j] = mean;
                self.data[j * d + i] = mean.conj();
            }
        }
    }

    /// Maximally mixed state ρ = I/2^n
    ///
    /// # Errors
    /// Returns error if `num_qubits` exceeds [`MAX_QUBITS`].
    pub fn maximally_mixed(num_qubits: usize) -> Result<Self> {
        let mut rho = Self::new(num_qubits)?;
        let dimension = rho.dimension();
        let value = Complex::new(T::of(1.0 / dimension as f64), T::zero());
        rho.data.iter_mut().for_each(|z| *z = Complex::new(T::zero(), T::zero()));
        for i in 0..dimension {
            rho.data[i * dimension + i] = value;
        }
        Ok(rho)
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Side length 2^n
    #[inline]
    pub fn dimension(&self) -> usize {
        1 << self.num_qubits
    }

    /// Element ρᵢⱼ
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex<T> {
        self.data[row * self.dimension() + col]
    }

    /// Row-major entries
    #[inline]
    pub fn data(&self) -> &[Complex<T>] {
        &self.data
    }

    pub fn into_data(self) -> Vec<Complex<T>> {
        self.data
    }

    fn column_axes(&self, axes: &[usize]) -> Vec<usize> {
        axes.iter().map(|a| a + self.num_qubits).collect()
    }

    fn check_operator(&self, matrix: &Matrix, axes: &[usize]) -> Result<()> {
        check_axes(axes, self.num_qubits)?;
        if matrix.dimension() != 1 << axes.len() {
            return Err(StateError::DimensionMismatch {
                expected: 1 << axes.len(),
                actual: matrix.dimension(),
            });
        }
        Ok(())
    }

    /// ρ → K ρ K† without any normalization
    fn conjugate_by(&mut self, matrix: &Matrix, axes: &[usize], parallel_threshold: usize) {
        let n2 = 2 * self.num_qubits;
        let columns = self.column_axes(axes);
        kernel::apply_matrix(&mut self.data, n2, &cast_matrix(matrix), axes, parallel_threshold);
        kernel::apply_matrix(&mut self.data, n2, &cast_matrix_conj(matrix), &columns, parallel_threshold);
    }

    /// Apply a unitary gate: ρ → U ρ U†
    ///
    /// # Errors
    /// Returns error on bad axes or a matrix of the wrong size.
    pub fn apply_unitary(&mut self, unitary: &Matrix, axes: &[usize], parallel_threshold: usize) -> Result<()> {
        self.check_operator(unitary, axes)?;
        self.conjugate_by(unitary, axes, parallel_threshold);
        Ok(())
    }

    /// Apply a mixture exactly: ρ → Σ pᵢ Uᵢ ρ Uᵢ†
    ///
    /// # Errors
    /// Returns error on bad axes or a matrix of the wrong size.
    pub fn apply_mixture(
        &mut self,
        branches: &[(f64, Matrix)],
        axes: &[usize],
        parallel_threshold: usize,
    ) -> Result<()> {
        let weighted: Vec<(T, &Matrix)> = branches.iter().map(|(p, u)| (T::of(*p), u)).collect();
        self.sum_over(&weighted, axes, parallel_threshold)
    }

    /// Apply a Kraus channel exactly: ρ → Σ Kᵢ ρ Kᵢ†
    ///
    /// # Errors
    /// Returns error on bad axes or a matrix of the wrong size.
    pub fn apply_kraus(&mut self, operators: &[Matrix], axes: &[usize], parallel_threshold: usize) -> Result<()> {
        let weighted: Vec<(T, &Matrix)> = operators.iter().map(|k| (T::one(), k)).collect();
        self.sum_over(&weighted, axes, parallel_threshold)
    }

    fn sum_over(&mut self, terms: &[(T, &Matrix)], axes: &[usize], parallel_threshold: usize) -> Result<()> {
        for (_, m) in terms {
            self.check_operator(m, axes)?;
        }
        let mut total = vec![Complex::new(T::zero(), T::zero()); self.data.len()];
        for (weight, m) in terms {
            if *weight == T::zero() {
                continue;
            }
            let mut term = self.clone();
            term.conjugate_by(m, axes, parallel_threshold);
            for (acc, z) in total.iter_mut().zip(&term.data) {
                *acc = *acc + *z * *weight;
            }
        }
        self.data = total;
        Ok(())
    }

    /// Measure `axes` in the computational basis: the outcome is drawn from
    /// Tr(PᵢρPᵢ) and ρ → PᵢρPᵢ / Tr(PᵢρPᵢ)
    ///
    /// # Errors
    /// Returns error on bad axes or a state with zero trace.
    pub fn measure<R: Rng + ?Sized>(&mut self, axes: &[usize], rng: &mut R) -> Result<Vec<bool>> {
        check_axes(axes, self.num_qubits)?;
        let n = self.num_qubits;
        let dimension = self.dimension();
        let mut weights = vec![0.0; 1 << axes.len()];
        for i in 0..dimension {
            weights[kernel::sub_index(i, n, axes)] += self.get(i, i).re.as_f64().max(0.0);
        }
        let outcome = kernel::sample_index(&weights, rng.gen::<f64>()).ok_or_else(|| {
            StateError::ZeroProbability {
                context: "measurement".to_string(),
            }
        })?;
        let scale = T::of(1.0 / weights[outcome]);
        let zero = Complex::new(T::zero(), T::zero());
        for row in 0..dimension {
            let keep_row = kernel::sub_index(row, n, axes) == outcome;
            for col in 0..dimension {
                let z = &mut self.data[row * dimension + col];
                *z = if keep_row && kernel::sub_index(col, n, axes) == outcome {
                    *z * scale
                } else {
                    zero
                };
            }
        }
        Ok(kernel::outcome_bits(outcome, axes.len()))
    }

    /// Probability of each basis state (the diagonal)
    pub fn probabilities(&self) -> Vec<f64> {
        (0..self.dimension()).map(|i| self.get(i, i).re.as_f64()).collect()
    }

    /// Real part of Tr(ρ)
    pub fn trace(&self) -> f64 {
        (0..self.dimension()).map(|i| self.get(i, i).re.as_f64()).sum()
    }

    /// Tr(ρ²) = Σᵢⱼ |ρᵢⱼ|² for Hermitian ρ; 1 for pure states
    pub fn purity(&self) -> f64 {
        self.data.iter().map(|z| z.norm_sqr().as_f64()).sum()
    }

    /// Largest |ρᵢⱼ − ρⱼᵢ*|
    pub fn hermiticity_error(&self) -> f64 {
        let d = self.dimension();
        let mut worst = 0.0f64;
        for i in 0..d {
            for j in i..d {
                let diff = widen(self.get(i, j)) - widen(self.get(j, i)).conj();
                worst = worst.max(diff.norm());
            }
        }
        worst
    }

    /// Eigenvalues of ρ in ascending order, computed in double precision
    pub fn eigenvalues(&self) -> Vec<f64> {
        let d = self.dimension();
        let matrix = DMatrix::<NaComplex<f64>>::from_fn(d, d, |i, j| {
            let z = widen(self.get(i, j));
            NaComplex::new(z.re, z.im)
        });
        let mut values: Vec<f64> = matrix.symmetric_eigenvalues().iter().copied().collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values
    }

    /// Check trace 1 and Hermiticity, and optionally positivity
    ///
    /// # Errors
    /// Returns `NumericDrift` naming the first violated invariant.
    pub fn validate(&self, tolerance: f64, check_positivity: bool) -> Result<()> {
        let trace_error = (self.trace() - 1.0).abs();
        if trace_error > tolerance {
            return Err(StateError::drift("trace", trace_error, tolerance));
        }
        let hermiticity = self.hermiticity_error();
        if hermiticity > tolerance {
            return Err(StateError::drift("hermiticity", hermiticity, tolerance));
        }
        if check_positivity {
            if let Some(&smallest) = self.eigenvalues().first() {
                if smallest < -tolerance {
                    return Err(StateError::drift("smallest eigenvalue", -smallest, tolerance));
                }
            }
        }
        Ok(())
    }

    /// Trace out the given axes, keeping the rest in order
    ///
    /// # Errors
    /// Returns error if an axis is out of range or repeated.
    pub fn partial_trace(&self, trace_axes: &[usize]) -> Result<Self> {
        check_axes(trace_axes, self.num_qubits)?;
        let n = self.num_qubits;
        let keep: Vec<usize> = (0..n).filter(|a| !trace_axes.contains(a)).collect();
        let reduced_dim = 1usize << keep.len();
        let mut reduced = vec![Complex::new(T::zero(), T::zero()); reduced_dim * reduced_dim];
        let traced_offsets = kernel::axis_offsets(n, trace_axes);
        let kept_offsets = kernel::axis_offsets(n, &keep);

        for (ri, &row) in kept_offsets.iter().enumerate() {
            for (ci, &col) in kept_offsets.iter().enumerate() {
                let entry = traced_offsets
                    .iter()
                    .fold(Complex::new(T::zero(), T::zero()), |acc, &t| acc + self.get(row | t, col | t));
                reduced[ri * reduced_dim + ci] = entry;
            }
        }

        Ok(Self {
            num_qubits: keep.len(),
            data: reduced,
        })
    }

    /// Reduced density matrix of `axes`, in the given order
    ///
    /// # Errors
    /// Returns error if an axis is out of range or repeated.
    pub fn reduced(&self, axes: &[usize]) -> Result<Self> {
        check_axes(axes, self.num_qubits)?;
        let traced: Vec<usize> = (0..self.num_qubits).filter(|a| !axes.contains(a)).collect();
        let mut kept_sorted = axes.to_vec();
        kept_sorted.sort_unstable();
        let mut rho = self.partial_trace(&traced)?;
        // partial_trace keeps axes ascending; permute into the requested order
        if kept_sorted != axes {
            let perm: Vec<usize> = axes
                .iter()
                .map(|a| kept_sorted.iter().position(|k| k == a).unwrap_or(0))
                .collect();
            rho = rho.permuted(&perm);
        }
        Ok(rho)
    }

    /// New matrix whose axis `i` is this matrix's axis `perm[i]`
    fn permuted(&self, perm: &[usize]) -> Self {
        let n = self.num_qubits;
        let d = self.dimension();
        let map = |index: usize| kernel::sub_index(index, n, perm);
        let mut data = vec![Complex::new(T::zero(), T::zero()); d * d];
        for row in 0..d {
            for col in 0..d {
                data[map(row) * d + map(col)] = self.get(row, col);
            }
        }
        Self { num_qubits: n, data }
    }
}

impl<T: Real> QuantumState<T> for DensityMatrix<T> {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn set_from(&mut self, input: StateInput<T>) -> Result<()> {
        *self = match input {
            StateInput::Basis(index) => Self::from_basis(self.num_qubits, index)?,
            StateInput::Vector(amplitudes) => {
                Self::from_state_vector(&StateVector::from_amplitudes(self.num_qubits, amplitudes)?)
            },
            StateInput::Matrix(data) => Self::from_matrix(self.num_qubits, data)?,
        };
        Ok(())
    }
}

impl<T: Real> From<&StateVector<T>> for DensityMatrix<T> {
    fn from(state: &StateVector<T>) -> Self {
        Self::from_state_vector(state)
    }
}

impl<T: Real> fmt::Display for DensityMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DensityMatrix({} qubits, {}):", self.num_qubits, T::NAME)?;
        let d = self.dimension();
        for i in 0..d.min(8) {
            write!(f, "  [")?;
            for j in 0..d.min(8) {
                if j > 0 {
                    write!(f, ", ")?;
                }
                let z = widen(self.get(i, j));
                write!(f, "{:.3}{:+.3}i", z.re, z.im)?;
            }
            if d > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if d > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}
