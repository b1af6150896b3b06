//! Numeric or symbolic gate parameters

use crate::resolver::ParamResolver;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Mul, Neg};

/// A gate or channel parameter
///
/// Either a concrete value, or a named symbol scaled by a constant
/// coefficient. Symbols are substituted by a [`ParamResolver`] before an
/// operation's matrix or Kraus form is constructed.
///
/// # Example
/// ```
/// use qmoment_core::{Param, ParamResolver};
///
/// let t = Param::symbol("x") * 0.5;
/// assert!(t.is_symbolic());
///
/// let resolver = ParamResolver::new().with("x", 2.0);
/// assert_eq!(t.resolve(&resolver).unwrap(), 1.0);
///
/// assert_eq!(Param::from(0.25).resolve(&ParamResolver::new()).unwrap(), 0.25);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Param {
    /// A concrete number
    Value(f64),
    /// `coefficient * name`
    Symbol { name: String, coefficient: f64 },
}

impl Param {
    /// A concrete parameter
    #[inline]
    pub const fn value(value: f64) -> Self {
        Self::Value(value)
    }

    /// A bare symbol
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol {
            name: name.into(),
            coefficient: 1.0,
        }
    }

    /// Multiply by a constant factor
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            Self::Value(v) => Self::Value(v * factor),
            Self::Symbol { name, coefficient } => Self::Symbol {
                name,
                coefficient: coefficient * factor,
            },
        }
    }

    /// Whether this parameter still references a symbol
    #[inline]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbol { .. })
    }

    /// Name of the referenced symbol, if any
    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::Symbol { name, .. } => Some(name),
        }
    }

    /// Concrete value, if the parameter is not symbolic
    pub fn as_value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Symbol { .. } => None,
        }
    }

    /// Substitute the symbol (if any) with the resolver's value
    ///
    /// # Errors
    /// Returns `UnresolvedParameter` if the resolver has no value for the symbol.
    pub fn resolve(&self, resolver: &ParamResolver) -> Result<f64> {
        match self {
            Self::Value(v) => Ok(*v),
            Self::Symbol { name, coefficient } => Ok(coefficient * resolver.resolve(name)?),
        }
    }
}

impl From<f64> for Param {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl Mul<f64> for Param {
    type Output = Param;

    fn mul(self, rhs: f64) -> Param {
        self.scaled(rhs)
    }
}

impl Neg for Param {
    type Output = Param;

    fn neg(self) -> Param {
        self.scaled(-1.0)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::Symbol { name, coefficient } if *coefficient == 1.0 => write!(f, "{}", name),
            Self::Symbol { name, coefficient } => write!(f, "{}*{}", coefficient, name),
        }
    }
}
