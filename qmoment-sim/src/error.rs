//! Error types for the simulator

use qmoment_core::{QuantumError, Qubit};
use qmoment_state::StateError;
use thiserror::Error;

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Errors that can occur during simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulatorError {
    /// The resolver has no value for a symbol the circuit references
    #[error("Unresolved parameter '{name}'")]
    UnresolvedParameter { name: String },

    /// Two operations in one moment share a qubit
    #[error("Malformed moment {moment}: qubit {qubit} is used by more than one operation")]
    MalformedMoment { moment: usize, qubit: Qubit },

    /// The engine cannot apply this operation exactly
    #[error("Unsupported operation '{name}': {reason}")]
    UnsupportedOperation { name: String, reason: String },

    /// A physical invariant of the state drifted beyond tolerance
    #[error("Numeric drift after moment {moment}: {quantity} deviates by {deviation:e} (tolerance {tolerance:e})")]
    NumericDrift {
        moment: usize,
        quantity: String,
        deviation: f64,
        tolerance: f64,
    },

    /// The requested qubit order lists a qubit twice
    #[error("Invalid qubit order: qubit {0} appears more than once")]
    InvalidOrderingRequest(Qubit),

    /// Circuit failed validation for another reason
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Initial or injected state does not fit the register
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Applying an operation to the state failed
    #[error("Execution failed: {0}")]
    Execution(String),

    /// Cancellation was requested before this moment started
    #[error("Simulation cancelled before moment {moment}")]
    Cancelled { moment: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No measurement with this key exists in the result
    #[error("Unknown measurement key '{0}'")]
    UnknownMeasurementKey(String),

    /// One sweep unit failed; carries its position in the sweep
    #[error("Sweep unit failed (resolver {resolver_index}{}): {source}",
        .repetition.map(|r| format!(", repetition {}", r)).unwrap_or_default())]
    UnitFailed {
        resolver_index: usize,
        repetition: Option<usize>,
        source: Box<SimulatorError>,
    },
}

impl SimulatorError {
    /// Attribute an error to a sweep unit
    pub fn in_unit(self, resolver_index: usize, repetition: Option<usize>) -> Self {
        Self::UnitFailed {
            resolver_index,
            repetition,
            source: Box::new(self),
        }
    }

    /// The underlying error, looking through any unit attribution
    pub fn root(&self) -> &SimulatorError {
        match self {
            Self::UnitFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for internal invariant violations rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self.root(), Self::NumericDrift { .. })
    }
}

impl From<QuantumError> for SimulatorError {
    fn from(err: QuantumError) -> Self {
        match err {
            QuantumError::UnresolvedParameter { name } => Self::UnresolvedParameter { name },
            QuantumError::MalformedMoment { moment, qubit } => Self::MalformedMoment { moment, qubit },
            QuantumError::InvalidOrderingRequest(qubit) => Self::InvalidOrderingRequest(qubit),
            other => Self::InvalidCircuit(other.to_string()),
        }
    }
}

impl From<StateError> for SimulatorError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::NumericDrift {
                quantity,
                deviation,
                tolerance,
            } => Self::NumericDrift {
                moment: 0,
                quantity,
                deviation,
                tolerance,
            },
            StateError::InvalidBasisState { .. }
            | StateError::DimensionMismatch { .. }
            | StateError::NotNormalized { .. }
            | StateError::NotPhysical { .. }
            | StateError::InvalidDimension { .. }
            | StateError::UnsupportedInput(_)
            | StateError::AllocationError { .. } => Self::InvalidState(err.to_string()),
            other => Self::Execution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantum_error_conversion() {
        let err: SimulatorError = QuantumError::unresolved("x").into();
        assert_eq!(err, SimulatorError::UnresolvedParameter { name: "x".into() });

        let err: SimulatorError = QuantumError::InvalidOrderingRequest(Qubit::line(2)).into();
        assert!(matches!(err, SimulatorError::InvalidOrderingRequest(_)));
    }

    #[test]
    fn test_state_error_conversion() {
        let err: SimulatorError = StateError::InvalidBasisState {
            index: 9,
            num_qubits: 2,
        }
        .into();
        assert!(matches!(err, SimulatorError::InvalidState(_)));

        let err: SimulatorError = StateError::drift("trace", 0.1, 1e-6).into();
        assert!(err.is_internal());

        let err: SimulatorError = StateError::NotPhysical {
            quantity: "trace".into(),
            deviation: 1.0,
        }
        .into();
        assert!(matches!(err, SimulatorError::InvalidState(_)));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_unit_attribution() {
        let err = SimulatorError::Cancelled { moment: 3 }.in_unit(1, Some(4));
        let msg = err.to_string();
        assert!(msg.contains("resolver 1"));
        assert!(msg.contains("repetition 4"));
        assert_eq!(err.root(), &SimulatorError::Cancelled { moment: 3 });

        let err = SimulatorError::UnresolvedParameter { name: "t".into() }.in_unit(0, None);
        assert!(!err.to_string().contains("repetition"));
    }
}
