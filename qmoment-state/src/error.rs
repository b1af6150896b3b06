//! Error types for state operations

use thiserror::Error;

/// Errors that can occur during state operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid axis index
    #[error("Invalid qubit axis {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// Invalid state dimension
    #[error("Invalid state dimension {dimension}, expected power of 2")]
    InvalidDimension { dimension: usize },

    /// State not normalized
    #[error("State not normalized, norm = {norm}")]
    NotNormalized { norm: f64 },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Basis-state integer outside the register
    #[error("Basis state {index} out of range for {num_qubits} qubits")]
    InvalidBasisState { index: u64, num_qubits: usize },

    /// A caller-supplied density matrix is not a physical state
    #[error("Not a physical density matrix: {quantity} deviates by {deviation:e}")]
    NotPhysical { quantity: String, deviation: f64 },

    /// Requested representation cannot hold the given input
    #[error("Unsupported state input: {0}")]
    UnsupportedInput(String),

    /// Every branch or outcome had zero probability
    #[error("Cannot sample from zero total probability in {context}")]
    ZeroProbability { context: String },

    /// A physical invariant drifted beyond tolerance
    #[error("Numeric drift: {quantity} deviates by {deviation:e} (tolerance {tolerance:e})")]
    NumericDrift {
        quantity: String,
        deviation: f64,
        tolerance: f64,
    },

    /// State too large to allocate
    #[error("Cannot allocate a state of {num_qubits} qubits")]
    AllocationError { num_qubits: usize },
}

impl StateError {
    pub fn drift(quantity: impl Into<String>, deviation: f64, tolerance: f64) -> Self {
        Self::NumericDrift {
            quantity: quantity.into(),
            deviation,
            tolerance,
        }
    }
}

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;
