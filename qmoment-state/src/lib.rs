//! Quantum state representations for qmoment
//!
//! This crate provides the two state representations the simulators evolve,
//! generic over the amplitude precision ([`Real`]: `f32` by default, `f64`
//! for higher accuracy):
//!
//! - [`StateVector`]: `2^n` amplitudes of a pure state
//! - [`DensityMatrix`]: the `2^n × 2^n` matrix of a mixed state
//!
//! Both share one tensor-contraction kernel ([`kernel::apply_matrix`]) that
//! applies a small matrix to selected axes of a big-endian buffer.
//!
//! # Example
//!
//! ```
//! use qmoment_core::{Complex64, Matrix};
//! use qmoment_state::{DensityMatrix, StateVector};
//!
//! let x = Matrix::from_2x2(
//!     Complex64::new(0.0, 0.0),
//!     Complex64::new(1.0, 0.0),
//!     Complex64::new(1.0, 0.0),
//!     Complex64::new(0.0, 0.0),
//! );
//!
//! let mut psi = StateVector::<f32>::new(2).unwrap();
//! psi.apply_matrix(&x, &[0], usize::MAX).unwrap();
//! assert_eq!(psi.probabilities()[2], 1.0);
//!
//! let rho = DensityMatrix::from_state_vector(&psi);
//! assert!((rho.trace() - 1.0).abs() < 1e-6);
//! ```

pub mod density_matrix;
pub mod error;
pub mod input;
pub mod kernel;
pub mod precision;
pub mod state_vector;

pub use density_matrix::DensityMatrix;
pub use error::{Result, StateError};
pub use input::{QuantumState, StateInput};
pub use precision::Real;
pub use state_vector::StateVector;
