//! Quantum gate library for qmoment
//!
//! Gates implement [`qmoment_core::Gate`]; their unitaries are built at
//! resolution time so exponents and rotation angles may be symbolic.
//!
//! - [`power`]: eigen-decomposed power gates (`X**t`, `CZ**t`, ...) and
//!   rotations expressed through them
//! - [`standard`]: the fixed gates X, Y, Z, H, S, T, CZ, CNOT, SWAP
//! - [`custom`]: gates from a caller-supplied matrix
//!
//! # Example
//!
//! ```
//! use qmoment_core::{Gate, Param, ParamResolver};
//! use qmoment_gates::{h, x_pow};
//!
//! let h = h().unitary(&ParamResolver::new()).unwrap();
//! assert!(h.is_unitary(1e-12));
//!
//! let half = x_pow(Param::symbol("x"))
//!     .unitary(&ParamResolver::new().with("x", 0.5))
//!     .unwrap();
//! assert!((half.get(0, 0).im - 0.5).abs() < 1e-12);
//! ```

pub mod custom;
pub mod matrices;
pub mod power;
pub mod standard;

pub use custom::{IdentityGate, MatrixGate};
pub use power::{cnot_pow, cz_pow, h_pow, rx, ry, rz, swap_pow, x_pow, y_pow, z_pow, PowGate, PowKind};
pub use standard::*;
