//! Error types for qmoment circuits

use crate::Qubit;
use thiserror::Error;

/// Errors raised while building or resolving circuits
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantumError {
    /// A symbol referenced by an operation has no value in the resolver
    #[error("Unresolved parameter '{name}'")]
    UnresolvedParameter { name: String },

    /// Two operations in the same moment act on the same qubit
    #[error("Malformed moment {moment}: qubit {qubit} is used by more than one operation")]
    MalformedMoment { moment: usize, qubit: Qubit },

    /// An explicit qubit order lists the same qubit twice
    #[error("Invalid qubit order: qubit {0} appears more than once")]
    InvalidOrderingRequest(Qubit),

    /// Operation applied to wrong number of qubits
    #[error("Operation '{name}' acts on {expected} qubits, but {actual} were provided")]
    InvalidQubitCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Duplicate qubit in a single operation
    #[error("Duplicate qubit {0} in operation")]
    DuplicateQubit(Qubit),

    /// Matrix has the wrong shape or is not unitary
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    /// Channel data violates normalization (probabilities or completeness)
    #[error("Invalid channel '{name}': {reason}")]
    InvalidChannel { name: String, reason: String },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl QuantumError {
    /// Create an unresolved parameter error
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedParameter { name: name.into() }
    }

    /// Create an invalid qubit count error
    pub fn invalid_qubit_count(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::InvalidQubitCount {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid channel error
    pub fn invalid_channel(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidChannel {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_parameter_message() {
        let err = QuantumError::unresolved("theta");
        assert_eq!(format!("{}", err), "Unresolved parameter 'theta'");
    }

    #[test]
    fn test_invalid_qubit_count_error() {
        let err = QuantumError::invalid_qubit_count("CNOT", 2, 1);
        let msg = format!("{}", err);
        assert!(msg.contains("CNOT"));
        assert!(msg.contains("2"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn test_malformed_moment_mentions_qubit() {
        let err = QuantumError::MalformedMoment {
            moment: 3,
            qubit: Qubit::line(7),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("moment 3"));
        assert!(msg.contains("q(7)"));
    }
}
