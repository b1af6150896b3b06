//! Pure-state amplitude vectors

use crate::error::{Result, StateError};
use crate::input::{check_axes, check_basis, QuantumState, StateInput};
use crate::kernel;
use crate::precision::{cast_matrix, widen, Real};
use num_complex::{Complex, Complex64};
use qmoment_core::Matrix;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest register a state vector will allocate
pub const MAX_QUBITS: usize = 30;

/// Quantum state vector of `2^n` amplitudes
///
/// Amplitudes are indexed big-endian over the simulation's qubit order:
/// axis 0 is the most significant bit of the index.
///
/// # Example
///
/// ```
/// use qmoment_state::StateVector;
///
/// let state = StateVector::<f32>::from_basis(2, 2).unwrap();
/// assert_eq!(state.dimension(), 4);
/// assert_eq!(state.dirac_notation(2), "|10⟩");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateVector<T: Real = f32> {
    num_qubits: usize,
    amplitudes: Vec<Complex<T>>,
}

impl<T: Real> StateVector<T> {
    /// Create a state vector initialized to |0...0⟩
    ///
    /// # Errors
    /// Returns error if `num_qubits` exceeds [`MAX_QUBITS`].
    pub fn new(num_qubits: usize) -> Result<Self> {
        Self::from_basis(num_qubits, 0)
    }

    /// Computational basis state with the given big-endian index
    ///
    /// # Errors
    /// Returns error if the index does not fit or the register is too large.
    pub fn from_basis(num_qubits: usize, index: u64) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::AllocationError { num_qubits });
        }
        let index = check_basis(index, num_qubits)?;
        let mut amplitudes = vec![Complex::new(T::zero(), T::zero()); 1 << num_qubits];
        amplitudes[index] = Complex::new(T::one(), T::zero());
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Create a state vector from amplitudes, checking normalization
    ///
    /// Amplitudes whose norm is within the accepted slack of 1 are rescaled
    /// to unit norm.
    ///
    /// # Errors
    /// Returns error if the length is not `2^num_qubits` or the norm is not
    /// 1 within the square root of the precision's default tolerance.
    pub fn from_amplitudes(num_qubits: usize, amplitudes: Vec<Complex<T>>) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::AllocationError { num_qubits });
        }
        let dimension = 1usize << num_qubits;
        if amplitudes.len() != dimension {
            return Err(StateError::DimensionMismatch {
                expected: dimension,
                actual: amplitudes.len(),
            });
        }
        let state = Self {
            num_qubits,
            amplitudes,
        };
        let norm = state.norm();
        if (norm - 1.0).abs() > T::DEFAULT_TOLERANCE.sqrt() {
            return Err(StateError::NotNormalized { norm });
        }
        let mut state = state;
        state.normalize()?;
        Ok(state)
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    #[inline]
    pub fn amplitudes(&self) -> &[Complex<T>] {
        &self.amplitudes
    }

    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex<T>] {
        &mut self.amplitudes
    }

    #[inline]
    pub fn amplitude(&self, index: usize) -> Complex<T> {
        self.amplitudes[index]
    }

    pub fn into_amplitudes(self) -> Vec<Complex<T>> {
        self.amplitudes
    }

    /// Σ |ψᵢ|², accumulated in double precision
    pub fn norm_squared(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr().as_f64()).sum()
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Rescale to unit norm
    ///
    /// # Errors
    /// Returns `ZeroProbability` if the state is the zero vector.
    pub fn normalize(&mut self) -> Result<()> {
        let norm = self.norm();
        if norm == 0.0 {
            return Err(StateError::ZeroProbability {
                context: "normalization".to_string(),
            });
        }
        let scale = T::of(1.0 / norm);
        self.amplitudes.iter_mut().for_each(|a| *a = *a * scale);
        Ok(())
    }

    /// Probability of each basis state
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr().as_f64()).collect()
    }

    /// Apply a unitary (or any square matrix) to the given axes
    ///
    /// # Errors
    /// Returns error if an axis is out of range or repeated, or the matrix
    /// size does not match the number of axes.
    pub fn apply_matrix(&mut self, matrix: &Matrix, axes: &[usize], parallel_threshold: usize) -> Result<()> {
        check_axes(axes, self.num_qubits)?;
        if matrix.dimension() != 1 << axes.len() {
            return Err(StateError::DimensionMismatch {
                expected: 1 << axes.len(),
                actual: matrix.dimension(),
            });
        }
        kernel::apply_matrix(
            &mut self.amplitudes,
            self.num_qubits,
            &cast_matrix(matrix),
            axes,
            parallel_threshold,
        );
        Ok(())
    }

    /// Apply one branch of a mixture, chosen by its probability
    ///
    /// Returns the index of the applied branch.
    ///
    /// # Errors
    /// Returns error on bad axes or if all probabilities are zero.
    pub fn apply_mixture<R: Rng + ?Sized>(
        &mut self,
        branches: &[(f64, Matrix)],
        axes: &[usize],
        rng: &mut R,
        parallel_threshold: usize,
    ) -> Result<usize> {
        let weights: Vec<f64> = branches.iter().map(|(p, _)| *p).collect();
        let chosen = kernel::sample_index(&weights, rng.gen::<f64>()).ok_or_else(|| {
            StateError::ZeroProbability {
                context: "mixture".to_string(),
            }
        })?;
        self.apply_matrix(&branches[chosen].1, axes, parallel_threshold)?;
        Ok(chosen)
    }

    /// Apply one Kraus operator, chosen with probability ‖Kᵢψ‖², then
    /// renormalize
    ///
    /// Returns the index of the applied operator.
    ///
    /// # Errors
    /// Returns error on bad axes or if every branch has zero weight.
    pub fn apply_kraus_sampled<R: Rng + ?Sized>(
        &mut self,
        operators: &[Matrix],
        axes: &[usize],
        rng: &mut R,
        parallel_threshold: usize,
    ) -> Result<usize> {
        let mut candidates = Vec::with_capacity(operators.len());
        for k in operators {
            let mut branch = self.clone();
            branch.apply_matrix(k, axes, parallel_threshold)?;
            candidates.push(branch);
        }
        let weights: Vec<f64> = candidates.iter().map(|s| s.norm_squared()).collect();
        let chosen = kernel::sample_index(&weights, rng.gen::<f64>()).ok_or_else(|| {
            StateError::ZeroProbability {
                context: "Kraus channel".to_string(),
            }
        })?;
        let mut next = candidates.swap_remove(chosen);
        next.normalize()?;
        *self = next;
        Ok(chosen)
    }

    /// Measure `axes` in the computational basis, collapsing the state
    ///
    /// Returns one bit per axis, in the given order.
    ///
    /// # Errors
    /// Returns error on bad axes or a zero state.
    pub fn measure<R: Rng + ?Sized>(&mut self, axes: &[usize], rng: &mut R) -> Result<Vec<bool>> {
        check_axes(axes, self.num_qubits)?;
        let weights = kernel::outcome_weights(&self.amplitudes, self.num_qubits, axes);
        let outcome = kernel::sample_index(&weights, rng.gen::<f64>()).ok_or_else(|| {
            StateError::ZeroProbability {
                context: "measurement".to_string(),
            }
        })?;
        let scale = T::of(1.0 / weights[outcome].sqrt());
        let zero = Complex::new(T::zero(), T::zero());
        let n = self.num_qubits;
        for (index, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp = if kernel::sub_index(index, n, axes) == outcome {
                *amp * scale
            } else {
                zero
            };
        }
        Ok(kernel::outcome_bits(outcome, axes.len()))
    }

    /// Reduced single-qubit Bloch vector `(x, y, z)` of an axis
    ///
    /// # Errors
    /// Returns error if the axis is out of range.
    pub fn bloch_vector(&self, axis: usize) -> Result<[f64; 3]> {
        check_axes(&[axis], self.num_qubits)?;
        let pos = kernel::bit_position(self.num_qubits, axis);
        let mask = 1usize << pos;
        let (mut p0, mut p1) = (0.0, 0.0);
        let mut coherence = Complex64::new(0.0, 0.0);
        for (index, amp) in self.amplitudes.iter().enumerate() {
            if index & mask == 0 {
                let a = widen(*amp);
                let b = widen(self.amplitudes[index | mask]);
                p0 += a.norm_sqr();
                p1 += b.norm_sqr();
                // ρ₁₀ = Σ ψ(..1..) ψ*(..0..)
                coherence += b * a.conj();
            }
        }
        Ok([2.0 * coherence.re, 2.0 * coherence.im, p0 - p1])
    }

    /// Ket notation of the non-negligible amplitudes, e.g. `0.71|00⟩ + 0.71|11⟩`
    pub fn dirac_notation(&self, decimals: usize) -> String {
        let threshold = 0.5 * 10f64.powi(-(decimals as i32));
        let terms: Vec<String> = self
            .amplitudes
            .iter()
            .enumerate()
            .filter_map(|(index, amp)| {
                let z = widen(*amp);
                if z.norm() < threshold {
                    return None;
                }
                let ket = format!("|{:0width$b}⟩", index, width = self.num_qubits);
                let coefficient = format_coefficient(z, decimals);
                Some(if coefficient.is_empty() {
                    ket
                } else {
                    format!("{}{}", coefficient, ket)
                })
            })
            .collect();
        if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join(" + ")
        }
    }
}

fn format_coefficient(z: Complex64, decimals: usize) -> String {
    let tiny = 0.5 * 10f64.powi(-(decimals as i32));
    let re = z.re.abs() >= tiny;
    let im = z.im.abs() >= tiny;
    match (re, im) {
        (true, false) if (z.re - 1.0).abs() < tiny => String::new(),
        (true, false) => format!("{:.*}", decimals, z.re),
        (false, true) => format!("{:.*}j", decimals, z.im),
        _ => format!("({:.*}{:+.*}j)", decimals, z.re, decimals, z.im),
    }
}

impl<T: Real> QuantumState<T> for StateVector<T> {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn set_from(&mut self, input: StateInput<T>) -> Result<()> {
        *self = match input {
            StateInput::Basis(index) => Self::from_basis(self.num_qubits, index)?,
            StateInput::Vector(amplitudes) => Self::from_amplitudes(self.num_qubits, amplitudes)?,
            StateInput::Matrix(_) => {
                return Err(StateError::UnsupportedInput(
                    "a state vector cannot hold a density matrix".to_string(),
                ))
            },
        };
        Ok(())
    }
}

impl<T: Real> fmt::Display for StateVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dirac_notation(3))
    }
}
