//! Core types and traits for noisy operations

use crate::matrix::Matrix;
use crate::parameter::Param;
use crate::resolver::ParamResolver;
use crate::{QuantumError, Result};
use num_complex::Complex64;
use std::fmt;

/// Default tolerance for channel normalization checks
pub const CHANNEL_TOLERANCE: f64 = 1e-8;

/// Concrete form of a resolved noise channel
///
/// A channel is either a probabilistic mixture of unitaries, which a pure
/// state simulation can sample exactly, or a general Kraus decomposition
/// `ρ → Σ_i K_i ρ K_i†` with `Σ_i K_i† K_i = I`.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelForm {
    /// `(p_i, U_i)` branches with `Σ p_i = 1`
    Mixture(Vec<(f64, Matrix)>),
    /// Kraus operators satisfying the completeness relation
    Kraus(Vec<Matrix>),
}

impl ChannelForm {
    /// Number of qubits the channel acts on
    pub fn num_qubits(&self) -> usize {
        match self {
            Self::Mixture(branches) => branches.first().map_or(0, |(_, u)| u.num_qubits()),
            Self::Kraus(ops) => ops.first().map_or(0, Matrix::num_qubits),
        }
    }

    /// Kraus operators equivalent to this channel (`√p_i U_i` for mixtures)
    pub fn kraus_operators(&self) -> Vec<Matrix> {
        match self {
            Self::Mixture(branches) => branches
                .iter()
                .map(|(p, u)| u.scale(Complex64::new(p.sqrt(), 0.0)))
                .collect(),
            Self::Kraus(ops) => ops.clone(),
        }
    }

    /// Check probabilities, unitarity and completeness
    ///
    /// # Errors
    /// Returns `InvalidChannel` describing the first violated condition.
    pub fn validate(&self, name: &str, tolerance: f64) -> Result<()> {
        match self {
            Self::Mixture(branches) => {
                if branches.is_empty() {
                    return Err(QuantumError::invalid_channel(name, "mixture has no branches"));
                }
                let dim = branches[0].1.dimension();
                let mut total = 0.0;
                for (p, u) in branches {
                    if !(0.0..=1.0 + tolerance).contains(p) {
                        return Err(QuantumError::invalid_channel(
                            name,
                            format!("branch probability {} outside [0, 1]", p),
                        ));
                    }
                    if u.dimension() != dim {
                        return Err(QuantumError::invalid_channel(name, "branch dimensions differ"));
                    }
                    if !u.is_unitary(tolerance) {
                        return Err(QuantumError::invalid_channel(name, "mixture branch is not unitary"));
                    }
                    total += p;
                }
                if (total - 1.0).abs() > tolerance {
                    return Err(QuantumError::invalid_channel(
                        name,
                        format!("branch probabilities sum to {}, expected 1", total),
                    ));
                }
                Ok(())
            },
            Self::Kraus(ops) => {
                if ops.is_empty() {
                    return Err(QuantumError::invalid_channel(name, "no Kraus operators"));
                }
                let dim = ops[0].dimension();
                if ops.iter().any(|k| k.dimension() != dim) {
                    return Err(QuantumError::invalid_channel(name, "Kraus dimensions differ"));
                }
                if !satisfies_completeness(ops, tolerance) {
                    return Err(QuantumError::invalid_channel(
                        name,
                        "Kraus operators violate Σ K† K = I",
                    ));
                }
                Ok(())
            },
        }
    }
}

/// Verify the completeness relation Σ K_i† K_i = I
pub fn satisfies_completeness(operators: &[Matrix], tolerance: f64) -> bool {
    let Some(first) = operators.first() else {
        return false;
    };
    let dim = first.dimension();
    let sum = operators
        .iter()
        .fold(Matrix::zeros(dim), |acc, k| &acc + &k.adjoint().matmul(k));
    sum.approx_eq(&Matrix::identity(dim), tolerance)
}

/// Trait for quantum noise channels
///
/// # Implementing a Custom Channel
///
/// ```
/// use qmoment_core::noise::{ChannelForm, NoiseChannel};
/// use qmoment_core::{Matrix, ParamResolver, Result};
///
/// #[derive(Debug)]
/// struct Nothing;
///
/// impl NoiseChannel for Nothing {
///     fn name(&self) -> &str { "nothing" }
///     fn num_qubits(&self) -> usize { 1 }
///     fn channel_form(&self, _: &ParamResolver) -> Result<ChannelForm> {
///         Ok(ChannelForm::Mixture(vec![(1.0, Matrix::identity(2))]))
///     }
/// }
/// ```
pub trait NoiseChannel: Send + Sync + fmt::Debug {
    /// Name of this noise channel (e.g., "depolarize", "amplitude_damp")
    fn name(&self) -> &str;

    /// Number of qubits this channel acts on
    fn num_qubits(&self) -> usize;

    /// Parameters carried by the channel, symbolic or not
    fn parameters(&self) -> Vec<&Param> {
        Vec::new()
    }

    /// Resolve parameters and build the concrete channel
    ///
    /// # Errors
    /// Returns `UnresolvedParameter` for missing symbols and
    /// `InvalidChannel` when resolved values are out of range.
    fn channel_form(&self, resolver: &ParamResolver) -> Result<ChannelForm>;

    /// Get a description of this channel
    fn description(&self) -> String {
        format!("{}-qubit {} channel", self.num_qubits(), self.name())
    }
}
