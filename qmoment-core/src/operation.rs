//! Operations: a gate, channel or measurement bound to qubits

use crate::gate::Gate;
use crate::matrix::Matrix;
use crate::noise::{ChannelForm, NoiseChannel, CHANNEL_TOLERANCE};
use crate::parameter::Param;
use crate::resolver::ParamResolver;
use crate::{QuantumError, Qubit, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A computational-basis measurement recorded under `key`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementSpec {
    pub key: String,
    /// Per-qubit flags; a set flag inverts the recorded bit
    pub invert_mask: Vec<bool>,
}

impl MeasurementSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            invert_mask: Vec::new(),
        }
    }

    /// Whether the bit recorded for the `index`-th measured qubit is inverted
    #[inline]
    pub fn inverts(&self, index: usize) -> bool {
        self.invert_mask.get(index).copied().unwrap_or(false)
    }
}

/// What an operation does, before parameter resolution
#[derive(Clone, Debug)]
pub enum OpKind {
    Gate(Arc<dyn Gate>),
    Channel(Arc<dyn NoiseChannel>),
    Measure(MeasurementSpec),
}

/// Concrete form of an operation after parameter resolution
///
/// This closed set of cases is what the engines dispatch on.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedOp {
    /// A unitary matrix
    Unitary(Matrix),
    /// `(p_i, U_i)` branches
    Mixture(Vec<(f64, Matrix)>),
    /// General Kraus operators
    Channel(Vec<Matrix>),
    /// Projective measurement in the computational basis
    Measure(MeasurementSpec),
}

impl ResolvedOp {
    /// Whether the operation maps pure states to pure states
    pub fn preserves_purity(&self) -> bool {
        !matches!(self, Self::Channel(_))
    }
}

/// A gate, channel or measurement applied to an ordered list of qubits
///
/// # Example
/// ```
/// use qmoment_core::{Operation, Qubit};
///
/// let q = Qubit::line_range(2);
/// let m = Operation::measure("result", &q).unwrap();
/// assert_eq!(m.qubits(), &q[..]);
/// assert!(m.is_measurement());
/// ```
#[derive(Clone)]
pub struct Operation {
    kind: OpKind,
    qubits: SmallVec<[Qubit; 2]>,
}

impl Operation {
    /// Bind a gate to qubits
    ///
    /// # Errors
    /// Returns error if the qubit count doesn't match or a qubit repeats.
    pub fn gate(gate: Arc<dyn Gate>, qubits: &[Qubit]) -> Result<Self> {
        check_qubits(gate.name(), gate.num_qubits(), qubits)?;
        Ok(Self {
            kind: OpKind::Gate(gate),
            qubits: qubits.iter().cloned().collect(),
        })
    }

    /// Bind a noise channel to qubits
    ///
    /// # Errors
    /// Returns error if the qubit count doesn't match or a qubit repeats.
    pub fn channel(channel: Arc<dyn NoiseChannel>, qubits: &[Qubit]) -> Result<Self> {
        check_qubits(channel.name(), channel.num_qubits(), qubits)?;
        Ok(Self {
            kind: OpKind::Channel(channel),
            qubits: qubits.iter().cloned().collect(),
        })
    }

    /// Measure qubits in the computational basis
    ///
    /// # Errors
    /// Returns error if no qubits are given or a qubit repeats.
    pub fn measure(key: impl Into<String>, qubits: &[Qubit]) -> Result<Self> {
        Self::measure_with(MeasurementSpec::new(key), qubits)
    }

    /// Measure with an explicit [`MeasurementSpec`] (e.g. an invert mask)
    ///
    /// # Errors
    /// Returns error if no qubits are given, a qubit repeats, or the mask is
    /// longer than the qubit list.
    pub fn measure_with(spec: MeasurementSpec, qubits: &[Qubit]) -> Result<Self> {
        if qubits.is_empty() {
            return Err(QuantumError::invalid_qubit_count(&spec.key, 1, 0));
        }
        check_qubits(&spec.key, qubits.len(), qubits)?;
        if spec.invert_mask.len() > qubits.len() {
            return Err(QuantumError::ValidationError(format!(
                "Invert mask of length {} for {} measured qubits",
                spec.invert_mask.len(),
                qubits.len()
            )));
        }
        Ok(Self {
            kind: OpKind::Measure(spec),
            qubits: qubits.iter().cloned().collect(),
        })
    }

    /// What the operation does
    #[inline]
    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// Qubits the operation acts on, in operation order
    #[inline]
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Display name of the gate, channel or measurement key
    pub fn name(&self) -> &str {
        match &self.kind {
            OpKind::Gate(g) => g.name(),
            OpKind::Channel(c) => c.name(),
            OpKind::Measure(spec) => &spec.key,
        }
    }

    #[inline]
    pub fn is_measurement(&self) -> bool {
        matches!(self.kind, OpKind::Measure(_))
    }

    /// Measurement key, if this is a measurement
    pub fn measurement_key(&self) -> Option<&str> {
        match &self.kind {
            OpKind::Measure(spec) => Some(&spec.key),
            _ => None,
        }
    }

    /// Parameters carried by the operation
    pub fn parameters(&self) -> Vec<&Param> {
        match &self.kind {
            OpKind::Gate(g) => g.parameters(),
            OpKind::Channel(c) => c.parameters(),
            OpKind::Measure(_) => Vec::new(),
        }
    }

    /// Names of the symbols this operation references
    pub fn symbols(&self) -> BTreeSet<String> {
        self.parameters()
            .into_iter()
            .filter_map(|p| p.symbol_name().map(str::to_string))
            .collect()
    }

    /// Substitute parameters and produce the concrete form
    ///
    /// # Errors
    /// Returns `UnresolvedParameter` for a missing symbol, `InvalidMatrix`
    /// if a gate's unitary has the wrong size or is not unitary, and
    /// `InvalidChannel` if a channel violates normalization.
    pub fn resolve(&self, resolver: &ParamResolver) -> Result<ResolvedOp> {
        let dim = 1usize << self.qubits.len();
        match &self.kind {
            OpKind::Gate(gate) => {
                let u = gate.unitary(resolver)?;
                if u.dimension() != dim {
                    return Err(QuantumError::InvalidMatrix(format!(
                        "{} produced a {}×{} matrix for {} qubits",
                        gate.name(),
                        u.dimension(),
                        u.dimension(),
                        self.qubits.len()
                    )));
                }
                if !u.is_unitary(CHANNEL_TOLERANCE) {
                    return Err(QuantumError::InvalidMatrix(format!("{} is not unitary", gate.name())));
                }
                Ok(ResolvedOp::Unitary(u))
            },
            OpKind::Channel(channel) => {
                let form = channel.channel_form(resolver)?;
                form.validate(channel.name(), CHANNEL_TOLERANCE)?;
                if form.num_qubits() != self.qubits.len() {
                    return Err(QuantumError::invalid_qubit_count(
                        channel.name(),
                        form.num_qubits(),
                        self.qubits.len(),
                    ));
                }
                Ok(match form {
                    ChannelForm::Mixture(branches) => ResolvedOp::Mixture(branches),
                    ChannelForm::Kraus(ops) => ResolvedOp::Channel(ops),
                })
            },
            OpKind::Measure(spec) => Ok(ResolvedOp::Measure(spec.clone())),
        }
    }
}

fn check_qubits(name: &str, expected: usize, qubits: &[Qubit]) -> Result<()> {
    if qubits.len() != expected {
        return Err(QuantumError::invalid_qubit_count(name, expected, qubits.len()));
    }
    for i in 0..qubits.len() {
        for j in (i + 1)..qubits.len() {
            if qubits[i] == qubits[j] {
                return Err(QuantumError::DuplicateQubit(qubits[i].clone()));
            }
        }
    }
    Ok(())
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OpKind::Measure(spec) => write!(f, "measure[{}](", spec.key)?,
            _ => write!(f, "{}(", self.name())?,
        }
        for (i, q) in self.qubits.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", q)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
