//! Standard gate constructors

use crate::power::{PowGate, PowKind};

/// Pauli-X (NOT): X|0⟩ = |1⟩
pub fn x() -> PowGate {
    PowGate::new(PowKind::X, 1.0)
}

/// Pauli-Y
pub fn y() -> PowGate {
    PowGate::new(PowKind::Y, 1.0)
}

/// Pauli-Z (phase flip)
pub fn z() -> PowGate {
    PowGate::new(PowKind::Z, 1.0)
}

/// Hadamard: H|0⟩ = (|0⟩ + |1⟩)/√2
pub fn h() -> PowGate {
    PowGate::new(PowKind::H, 1.0)
}

/// S = Z**0.5 = diag(1, i)
pub fn s() -> PowGate {
    PowGate::new(PowKind::Z, 0.5).with_name("S")
}

/// T = Z**0.25 = diag(1, e^{iπ/4})
pub fn t() -> PowGate {
    PowGate::new(PowKind::Z, 0.25).with_name("T")
}

/// Controlled-Z
pub fn cz() -> PowGate {
    PowGate::new(PowKind::CZ, 1.0)
}

/// Controlled-NOT, control first
pub fn cnot() -> PowGate {
    PowGate::new(PowKind::CNOT, 1.0)
}

pub fn swap() -> PowGate {
    PowGate::new(PowKind::SWAP, 1.0)
}
