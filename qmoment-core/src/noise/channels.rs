//! Implementations of common quantum noise channels

use super::types::{ChannelForm, NoiseChannel, CHANNEL_TOLERANCE};
use crate::matrix::Matrix;
use crate::parameter::Param;
use crate::resolver::ParamResolver;
use crate::{QuantumError, Result};
use num_complex::Complex64;

fn real(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

fn pauli_x() -> Matrix {
    Matrix::from_2x2(real(0.0), real(1.0), real(1.0), real(0.0))
}

fn pauli_y() -> Matrix {
    Matrix::from_2x2(real(0.0), Complex64::new(0.0, -1.0), Complex64::new(0.0, 1.0), real(0.0))
}

fn pauli_z() -> Matrix {
    Matrix::from_2x2(real(1.0), real(0.0), real(0.0), real(-1.0))
}

/// Resolve a probability-like parameter and check it lies in [0, 1]
fn resolve_probability(name: &str, param: &Param, resolver: &ParamResolver) -> Result<f64> {
    let p = param.resolve(resolver)?;
    if !(0.0..=1.0).contains(&p) {
        return Err(QuantumError::invalid_channel(
            name,
            format!("probability must be in [0,1], got {}", p),
        ));
    }
    Ok(p)
}

/// Bit flip channel: X with probability p
///
/// # Example
/// ```
/// use qmoment_core::noise::{BitFlip, ChannelForm, NoiseChannel};
/// use qmoment_core::ParamResolver;
///
/// let form = BitFlip::new(0.2).channel_form(&ParamResolver::new()).unwrap();
/// assert!(matches!(form, ChannelForm::Mixture(ref b) if b.len() == 2));
/// ```
#[derive(Debug, Clone)]
pub struct BitFlip {
    p: Param,
}

impl BitFlip {
    pub fn new(p: impl Into<Param>) -> Self {
        Self { p: p.into() }
    }
}

impl NoiseChannel for BitFlip {
    fn name(&self) -> &str {
        "bit_flip"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn parameters(&self) -> Vec<&Param> {
        vec![&self.p]
    }

    fn channel_form(&self, resolver: &ParamResolver) -> Result<ChannelForm> {
        let p = resolve_probability(self.name(), &self.p, resolver)?;
        Ok(ChannelForm::Mixture(vec![(1.0 - p, Matrix::identity(2)), (p, pauli_x())]))
    }
}

/// Phase flip channel: Z with probability p
#[derive(Debug, Clone)]
pub struct PhaseFlip {
    p: Param,
}

impl PhaseFlip {
    pub fn new(p: impl Into<Param>) -> Self {
        Self { p: p.into() }
    }
}

impl NoiseChannel for PhaseFlip {
    fn name(&self) -> &str {
        "phase_flip"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn parameters(&self) -> Vec<&Param> {
        vec![&self.p]
    }

    fn channel_form(&self, resolver: &ParamResolver) -> Result<ChannelForm> {
        let p = resolve_probability(self.name(), &self.p, resolver)?;
        Ok(ChannelForm::Mixture(vec![(1.0 - p, Matrix::identity(2)), (p, pauli_z())]))
    }
}

/// Depolarizing noise channel on one or more qubits
///
/// With probability `1 - p` nothing happens; otherwise one of the
/// `4^n - 1` non-identity Pauli strings is applied, uniformly at random.
///
/// # Kraus Operators (n = 1)
/// ```text
/// K₀ = √(1-p) I
/// K₁ = √(p/3) X
/// K₂ = √(p/3) Y
/// K₃ = √(p/3) Z
/// ```
#[derive(Debug, Clone)]
pub struct Depolarizing {
    p: Param,
    num_qubits: usize,
}

impl Depolarizing {
    /// Single-qubit depolarizing channel
    pub fn new(p: impl Into<Param>) -> Self {
        Self::on_qubits(p, 1)
    }

    /// Depolarizing channel over `num_qubits` qubits
    pub fn on_qubits(p: impl Into<Param>, num_qubits: usize) -> Self {
        Self {
            p: p.into(),
            num_qubits: num_qubits.max(1),
        }
    }

    /// All n-qubit Pauli strings, identity first
    fn pauli_strings(n: usize) -> Vec<Matrix> {
        let singles = [Matrix::identity(2), pauli_x(), pauli_y(), pauli_z()];
        (0..n).fold(vec![Matrix::identity(1)], |acc, _| {
            acc.iter()
                .flat_map(|m| singles.iter().map(move |s| m.kron(s)))
                .collect()
        })
    }
}

impl NoiseChannel for Depolarizing {
    fn name(&self) -> &str {
        "depolarize"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn parameters(&self) -> Vec<&Param> {
        vec![&self.p]
    }

    fn channel_form(&self, resolver: &ParamResolver) -> Result<ChannelForm> {
        let p = resolve_probability(self.name(), &self.p, resolver)?;
        let strings = Self::pauli_strings(self.num_qubits);
        let each = p / (strings.len() - 1) as f64;
        Ok(ChannelForm::Mixture(
            strings
                .into_iter()
                .enumerate()
                .map(|(i, m)| (if i == 0 { 1.0 - p } else { each }, m))
                .collect(),
        ))
    }
}

/// Independent X, Y and Z errors with individual probabilities
#[derive(Debug, Clone)]
pub struct AsymmetricDepolarizing {
    p_x: Param,
    p_y: Param,
    p_z: Param,
}

impl AsymmetricDepolarizing {
    pub fn new(p_x: impl Into<Param>, p_y: impl Into<Param>, p_z: impl Into<Param>) -> Self {
        Self {
            p_x: p_x.into(),
            p_y: p_y.into(),
            p_z: p_z.into(),
        }
    }
}

impl NoiseChannel for AsymmetricDepolarizing {
    fn name(&self) -> &str {
        "asymmetric_depolarize"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn parameters(&self) -> Vec<&Param> {
        vec![&self.p_x, &self.p_y, &self.p_z]
    }

    fn channel_form(&self, resolver: &ParamResolver) -> Result<ChannelForm> {
        let p_x = resolve_probability(self.name(), &self.p_x, resolver)?;
        let p_y = resolve_probability(self.name(), &self.p_y, resolver)?;
        let p_z = resolve_probability(self.name(), &self.p_z, resolver)?;
        let p_i = 1.0 - p_x - p_y - p_z;
        if p_i < -CHANNEL_TOLERANCE {
            return Err(QuantumError::invalid_channel(
                self.name(),
                format!("p_x + p_y + p_z = {} exceeds 1", p_x + p_y + p_z),
            ));
        }
        Ok(ChannelForm::Mixture(vec![
            (p_i.max(0.0), Matrix::identity(2)),
            (p_x, pauli_x()),
            (p_y, pauli_y()),
            (p_z, pauli_z()),
        ]))
    }
}

/// Amplitude damping channel
///
/// Models energy relaxation (T1 decay): |1⟩ → |0⟩ with probability γ.
///
/// # Kraus Operators
/// ```text
/// K₀ = [[1, 0], [0, √(1-γ)]]
/// K₁ = [[0, √γ], [0, 0]]
/// ```
#[derive(Debug, Clone)]
pub struct AmplitudeDamping {
    gamma: Param,
}

impl AmplitudeDamping {
    pub fn new(gamma: impl Into<Param>) -> Self {
        Self {
            gamma: gamma.into(),
        }
    }

    /// Create from T1 relaxation time and gate duration, γ = 1 - exp(-t/T1)
    ///
    /// # Errors
    /// Returns error if `t1` is not positive or `gate_time` is negative.
    pub fn from_t1(t1: f64, gate_time: f64) -> Result<Self> {
        if t1 <= 0.0 {
            return Err(QuantumError::ValidationError("T1 must be positive".to_string()));
        }
        if gate_time < 0.0 {
            return Err(QuantumError::ValidationError(
                "Gate time must be non-negative".to_string(),
            ));
        }
        Ok(Self::new(1.0 - (-gate_time / t1).exp()))
    }
}

impl NoiseChannel for AmplitudeDamping {
    fn name(&self) -> &str {
        "amplitude_damp"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn parameters(&self) -> Vec<&Param> {
        vec![&self.gamma]
    }

    fn channel_form(&self, resolver: &ParamResolver) -> Result<ChannelForm> {
        let gamma = resolve_probability(self.name(), &self.gamma, resolver)?;
        Ok(ChannelForm::Kraus(vec![
            Matrix::from_2x2(real(1.0), real(0.0), real(0.0), real((1.0 - gamma).sqrt())),
            Matrix::from_2x2(real(0.0), real(gamma.sqrt()), real(0.0), real(0.0)),
        ]))
    }
}

/// Generalized amplitude damping: relaxation towards a thermal state
///
/// With probability `p` the qubit decays towards |0⟩, otherwise it is
/// excited towards |1⟩, each at rate γ.
#[derive(Debug, Clone)]
pub struct GeneralizedAmplitudeDamping {
    p: Param,
    gamma: Param,
}

impl GeneralizedAmplitudeDamping {
    pub fn new(p: impl Into<Param>, gamma: impl Into<Param>) -> Self {
        Self {
            p: p.into(),
            gamma: gamma.into(),
        }
    }
}

impl NoiseChannel for GeneralizedAmplitudeDamping {
    fn name(&self) -> &str {
        "generalized_amplitude_damp"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn parameters(&self) -> Vec<&Param> {
        vec![&self.p, &self.gamma]
    }

    fn channel_form(&self, resolver: &ParamResolver) -> Result<ChannelForm> {
        let p = resolve_probability(self.name(), &self.p, resolver)?;
        let gamma = resolve_probability(self.name(), &self.gamma, resolver)?;
        let (sp, sq) = (p.sqrt(), (1.0 - p).sqrt());
        let (sg, sr) = (gamma.sqrt(), (1.0 - gamma).sqrt());
        Ok(ChannelForm::Kraus(vec![
            Matrix::from_2x2(real(sp), real(0.0), real(0.0), real(sp * sr)),
            Matrix::from_2x2(real(0.0), real(sp * sg), real(0.0), real(0.0)),
            Matrix::from_2x2(real(sq * sr), real(0.0), real(0.0), real(sq)),
            Matrix::from_2x2(real(0.0), real(0.0), real(sq * sg), real(0.0)),
        ]))
    }
}

/// Phase damping channel (T2 dephasing without energy loss)
///
/// # Kraus Operators
/// ```text
/// K₀ = [[1, 0], [0, √(1-γ)]]
/// K₁ = [[0, 0], [0, √γ]]
/// ```
#[derive(Debug, Clone)]
pub struct PhaseDamping {
    gamma: Param,
}

impl PhaseDamping {
    pub fn new(gamma: impl Into<Param>) -> Self {
        Self {
            gamma: gamma.into(),
        }
    }
}

impl NoiseChannel for PhaseDamping {
    fn name(&self) -> &str {
        "phase_damp"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn parameters(&self) -> Vec<&Param> {
        vec![&self.gamma]
    }

    fn channel_form(&self, resolver: &ParamResolver) -> Result<ChannelForm> {
        let gamma = resolve_probability(self.name(), &self.gamma, resolver)?;
        Ok(ChannelForm::Kraus(vec![
            Matrix::from_2x2(real(1.0), real(0.0), real(0.0), real((1.0 - gamma).sqrt())),
            Matrix::from_2x2(real(0.0), real(0.0), real(0.0), real(gamma.sqrt())),
        ]))
    }
}

/// Non-unitary reset to |0⟩
#[derive(Debug, Clone, Copy, Default)]
pub struct Reset;

impl NoiseChannel for Reset {
    fn name(&self) -> &str {
        "reset"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn channel_form(&self, _resolver: &ParamResolver) -> Result<ChannelForm> {
        Ok(ChannelForm::Kraus(vec![
            Matrix::from_2x2(real(1.0), real(0.0), real(0.0), real(0.0)),
            Matrix::from_2x2(real(0.0), real(1.0), real(0.0), real(0.0)),
        ]))
    }
}

/// A fixed, user-supplied mixture of unitaries
#[derive(Debug, Clone)]
pub struct MixtureChannel {
    name: String,
    branches: Vec<(f64, Matrix)>,
}

impl MixtureChannel {
    /// Create a mixture, validating probabilities and unitarity
    ///
    /// # Errors
    /// Returns `InvalidChannel` if the branches do not form a mixture.
    pub fn new(name: impl Into<String>, branches: Vec<(f64, Matrix)>) -> Result<Self> {
        let name = name.into();
        ChannelForm::Mixture(branches.clone()).validate(&name, CHANNEL_TOLERANCE)?;
        Ok(Self { name, branches })
    }
}

impl NoiseChannel for MixtureChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.branches[0].1.num_qubits()
    }

    fn channel_form(&self, _resolver: &ParamResolver) -> Result<ChannelForm> {
        Ok(ChannelForm::Mixture(self.branches.clone()))
    }
}

/// A fixed, user-supplied Kraus channel
///
/// # Example
/// ```
/// use qmoment_core::noise::KrausChannel;
/// use qmoment_core::Matrix;
///
/// // Not complete: rejected
/// assert!(KrausChannel::new("bad", vec![Matrix::zeros(2)]).is_err());
/// assert!(KrausChannel::new("id", vec![Matrix::identity(2)]).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct KrausChannel {
    name: String,
    operators: Vec<Matrix>,
}

impl KrausChannel {
    /// Create a Kraus channel, validating the completeness relation
    ///
    /// # Errors
    /// Returns `InvalidChannel` if Σ K† K ≠ I.
    pub fn new(name: impl Into<String>, operators: Vec<Matrix>) -> Result<Self> {
        let name = name.into();
        ChannelForm::Kraus(operators.clone()).validate(&name, CHANNEL_TOLERANCE)?;
        Ok(Self { name, operators })
    }
}

impl NoiseChannel for KrausChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.operators[0].num_qubits()
    }

    fn channel_form(&self, _resolver: &ParamResolver) -> Result<ChannelForm> {
        Ok(ChannelForm::Kraus(self.operators.clone()))
    }
}
