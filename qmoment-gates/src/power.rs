//! Gates raised to real, possibly symbolic, exponents
//!
//! Every base gate here is a Hermitian involution (`U² = I`), so it splits
//! into the projectors `P₀ = (I + U)/2` and `P₁ = (I − U)/2` onto its +1 and
//! −1 eigenspaces. Raising to the exponent `t` then means
//!
//! ```text
//! U^t = e^{iπ t s} (P₀ + e^{iπ t} P₁)
//! ```
//!
//! where `s` is the global shift. `t = 1, s = 0` recovers the base gate,
//! `t = 0` the identity, and `t = 1/2` the principal square root:
//! `X**0.5 |0⟩ = (0.5+0.5i)|0⟩ + (0.5−0.5i)|1⟩`.

use crate::matrices;
use num_complex::Complex64;
use qmoment_core::{Gate, Matrix, Param, ParamResolver, Result};
use std::f64::consts::PI;

/// Base gates that can be raised to a power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowKind {
    X,
    Y,
    Z,
    H,
    CZ,
    CNOT,
    SWAP,
}

impl PowKind {
    pub fn base_name(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::H => "H",
            Self::CZ => "CZ",
            Self::CNOT => "CNOT",
            Self::SWAP => "SWAP",
        }
    }

    pub fn num_qubits(self) -> usize {
        match self {
            Self::X | Self::Y | Self::Z | Self::H => 1,
            Self::CZ | Self::CNOT | Self::SWAP => 2,
        }
    }

    /// Matrix of the gate at exponent 1
    pub fn base_matrix(self) -> Matrix {
        match self {
            Self::X => matrices::to_matrix(&matrices::PAULI_X),
            Self::Y => matrices::to_matrix(&matrices::PAULI_Y),
            Self::Z => matrices::to_matrix(&matrices::PAULI_Z),
            Self::H => matrices::to_matrix(&matrices::HADAMARD),
            Self::CZ => matrices::to_matrix(&matrices::CZ),
            Self::CNOT => matrices::to_matrix(&matrices::CNOT),
            Self::SWAP => matrices::to_matrix(&matrices::SWAP),
        }
    }

    /// Projectors onto the +1 and −1 eigenspaces
    fn projectors(self) -> (Matrix, Matrix) {
        let u = self.base_matrix();
        let id = Matrix::identity(u.dimension());
        let half = Complex64::new(0.5, 0.0);
        let plus = (&id + &u).scale(half);
        let minus = (&id + &u.scale(Complex64::new(-1.0, 0.0))).scale(half);
        (plus, minus)
    }
}

/// A base gate raised to `exponent`, with an optional global phase shift
///
/// # Example
/// ```
/// use qmoment_core::{Gate, Param, ParamResolver};
/// use qmoment_gates::power::x_pow;
///
/// let gate = x_pow(Param::symbol("x"));
/// assert_eq!(gate.name(), "X**x");
///
/// let flip = gate.unitary(&ParamResolver::new().with("x", 1.0)).unwrap();
/// assert!((flip.get(1, 0).re - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct PowGate {
    kind: PowKind,
    exponent: Param,
    global_shift: f64,
    name: String,
}

impl PowGate {
    /// `kind ** exponent`
    pub fn new(kind: PowKind, exponent: impl Into<Param>) -> Self {
        let exponent = exponent.into();
        let name = match exponent {
            Param::Value(v) if v == 1.0 => kind.base_name().to_string(),
            ref e => format!("{}**{}", kind.base_name(), e),
        };
        Self {
            kind,
            exponent,
            global_shift: 0.0,
            name,
        }
    }

    /// Multiply the unitary by `e^{iπ t s}`
    pub fn with_global_shift(mut self, shift: f64) -> Self {
        self.global_shift = shift;
        self
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn kind(&self) -> PowKind {
        self.kind
    }

    #[inline]
    pub fn exponent(&self) -> &Param {
        &self.exponent
    }

    #[inline]
    pub fn global_shift(&self) -> f64 {
        self.global_shift
    }

    /// Unitary for an already resolved exponent
    pub fn matrix_at(&self, exponent: f64) -> Matrix {
        let (plus, minus) = self.kind.projectors();
        let global = Complex64::from_polar(1.0, PI * exponent * self.global_shift);
        let relative = Complex64::from_polar(1.0, PI * exponent);
        (&plus + &minus.scale(relative)).scale(global)
    }
}

impl Gate for PowGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.kind.num_qubits()
    }

    fn parameters(&self) -> Vec<&Param> {
        vec![&self.exponent]
    }

    fn unitary(&self, resolver: &ParamResolver) -> Result<Matrix> {
        let t = self.exponent.resolve(resolver)?;
        Ok(self.matrix_at(t))
    }
}

pub fn x_pow(exponent: impl Into<Param>) -> PowGate {
    PowGate::new(PowKind::X, exponent)
}

pub fn y_pow(exponent: impl Into<Param>) -> PowGate {
    PowGate::new(PowKind::Y, exponent)
}

pub fn z_pow(exponent: impl Into<Param>) -> PowGate {
    PowGate::new(PowKind::Z, exponent)
}

pub fn h_pow(exponent: impl Into<Param>) -> PowGate {
    PowGate::new(PowKind::H, exponent)
}

pub fn cz_pow(exponent: impl Into<Param>) -> PowGate {
    PowGate::new(PowKind::CZ, exponent)
}

pub fn cnot_pow(exponent: impl Into<Param>) -> PowGate {
    PowGate::new(PowKind::CNOT, exponent)
}

pub fn swap_pow(exponent: impl Into<Param>) -> PowGate {
    PowGate::new(PowKind::SWAP, exponent)
}

/// Rotation by `theta` radians: `X**(θ/π)` with global shift −1/2
///
/// Equals `cos(θ/2) I − i sin(θ/2) X`.
pub fn rx(theta: impl Into<Param>) -> PowGate {
    rotation(PowKind::X, "Rx", theta.into())
}

/// Rotation by `theta` radians about Y
pub fn ry(theta: impl Into<Param>) -> PowGate {
    rotation(PowKind::Y, "Ry", theta.into())
}

/// Rotation by `theta` radians about Z: `diag(e^{−iθ/2}, e^{iθ/2})`
pub fn rz(theta: impl Into<Param>) -> PowGate {
    rotation(PowKind::Z, "Rz", theta.into())
}

fn rotation(kind: PowKind, label: &str, theta: Param) -> PowGate {
    let name = format!("{}({})", label, theta);
    PowGate::new(kind, theta.scaled(1.0 / PI))
        .with_global_shift(-0.5)
        .with_name(name)
}
