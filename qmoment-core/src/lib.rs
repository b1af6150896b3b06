//! Core types for the qmoment circuit simulators
//!
//! This crate provides the read-only circuit model the simulators consume:
//! - [`Qubit`]: opaque, totally ordered qubit identities
//! - [`Param`] and [`ParamResolver`]: symbolic parameters and their values
//! - [`Gate`] and [`noise::NoiseChannel`]: unitary and noisy operations
//! - [`Operation`], [`Moment`], [`Circuit`]: the layered circuit structure
//! - [`QubitOrder`]: the canonical axis order of a simulation
//!
//! # Example
//! ```
//! use qmoment_core::{Circuit, Operation, Qubit, QubitOrder};
//!
//! let q = Qubit::line_range(2);
//! let circuit = Circuit::from_operations(vec![Operation::measure("m", &q).unwrap()]);
//! let order = QubitOrder::Default.order_for(&circuit.all_qubits()).unwrap();
//! assert_eq!(order, q);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod matrix;
pub mod moment;
pub mod noise;
pub mod operation;
pub mod parameter;
pub mod qubit;
pub mod qubit_order;
pub mod resolver;
pub mod sweep;

// Re-exports for convenience
pub use circuit::Circuit;
pub use error::QuantumError;
pub use gate::Gate;
pub use matrix::Matrix;
pub use moment::Moment;
pub use num_complex::Complex64;
pub use operation::{MeasurementSpec, OpKind, Operation, ResolvedOp};
pub use parameter::Param;
pub use qubit::Qubit;
pub use qubit_order::{qubit_map, QubitOrder};
pub use resolver::ParamResolver;
pub use sweep::Sweep;

/// Type alias for results in qmoment-core
pub type Result<T> = std::result::Result<T, QuantumError>;
