//! Unitary gate abstraction

use crate::matrix::Matrix;
use crate::parameter::Param;
use crate::resolver::ParamResolver;
use crate::Result;
use std::fmt;

/// Trait for unitary quantum gates
///
/// Gates are stateless descriptions; the qubits they act on are attached by
/// [`Operation`](crate::Operation). A gate may carry symbolic
/// [`Param`]s, which are substituted when the unitary is constructed.
///
/// # Example
/// ```
/// use qmoment_core::{Gate, Matrix, Param, ParamResolver, Result};
///
/// #[derive(Debug)]
/// struct Identity1;
///
/// impl Gate for Identity1 {
///     fn name(&self) -> &str { "I" }
///     fn num_qubits(&self) -> usize { 1 }
///     fn unitary(&self, _: &ParamResolver) -> Result<Matrix> {
///         Ok(Matrix::identity(2))
///     }
/// }
///
/// let m = Identity1.unitary(&ParamResolver::new()).unwrap();
/// assert!(m.is_unitary(1e-12));
/// ```
pub trait Gate: Send + Sync + fmt::Debug {
    /// The name of the gate (e.g., "X", "CZ**0.5")
    fn name(&self) -> &str;

    /// Number of qubits this gate acts on
    fn num_qubits(&self) -> usize;

    /// Parameters carried by the gate, symbolic or not
    fn parameters(&self) -> Vec<&Param> {
        Vec::new()
    }

    /// Whether any parameter still references a symbol
    fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Resolve parameters and build the `2^n × 2^n` unitary
    ///
    /// # Errors
    /// Returns `UnresolvedParameter` if a symbol has no value.
    fn unitary(&self, resolver: &ParamResolver) -> Result<Matrix>;
}
