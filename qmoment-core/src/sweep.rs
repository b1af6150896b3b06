//! Parameter sweeps expanding into ordered resolver lists

use crate::resolver::ParamResolver;
use crate::{QuantumError, Result};
use serde::{Deserialize, Serialize};

/// A sequence of parameter assignments
///
/// Sweeps expand into the ordered `Vec<ParamResolver>` consumed by the
/// simulators' sweep entry points.
///
/// # Example
/// ```
/// use qmoment_core::Sweep;
///
/// let sweep = Sweep::product(vec![
///     Sweep::points("a", vec![0.0, 1.0]),
///     Sweep::linspace("b", 0.0, 1.0, 3),
/// ]);
/// let resolvers = sweep.resolvers();
/// assert_eq!(resolvers.len(), 6);
/// assert_eq!(resolvers[1].get("b"), Some(0.5));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Sweep {
    /// A single empty assignment
    Unit,
    /// Explicit values for one symbol
    Points { key: String, values: Vec<f64> },
    /// `length` evenly spaced values from `start` to `stop` inclusive
    Linspace {
        key: String,
        start: f64,
        stop: f64,
        length: usize,
    },
    /// Cartesian product; the first factor varies slowest
    Product(Vec<Sweep>),
    /// Element-wise combination of equal-length sweeps
    Zip(Vec<Sweep>),
}

impl Sweep {
    /// Explicit points sweep
    pub fn points(key: impl Into<String>, values: Vec<f64>) -> Self {
        Self::Points {
            key: key.into(),
            values,
        }
    }

    /// Evenly spaced sweep
    pub fn linspace(key: impl Into<String>, start: f64, stop: f64, length: usize) -> Self {
        Self::Linspace {
            key: key.into(),
            start,
            stop,
            length,
        }
    }

    /// Cartesian product of sweeps
    pub fn product(factors: Vec<Sweep>) -> Self {
        Self::Product(factors)
    }

    /// Zip sweeps of equal length
    ///
    /// # Errors
    /// Returns a validation error if the sweeps differ in length.
    pub fn zip(parts: Vec<Sweep>) -> Result<Self> {
        if let Some(first) = parts.first() {
            let len = first.len();
            if let Some(bad) = parts.iter().find(|s| s.len() != len) {
                return Err(QuantumError::ValidationError(format!(
                    "Cannot zip sweeps of lengths {} and {}",
                    len,
                    bad.len()
                )));
            }
        }
        Ok(Self::Zip(parts))
    }

    /// Number of assignments
    pub fn len(&self) -> usize {
        match self {
            Self::Unit => 1,
            Self::Points { values, .. } => values.len(),
            Self::Linspace { length, .. } => *length,
            Self::Product(factors) => factors.iter().map(Sweep::len).product(),
            Self::Zip(parts) => parts.iter().map(Sweep::len).min().unwrap_or(1),
        }
    }

    /// Whether the sweep produces no assignments
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbol names assigned by this sweep
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Unit => Vec::new(),
            Self::Points { key, .. } | Self::Linspace { key, .. } => vec![key.as_str()],
            Self::Product(parts) | Self::Zip(parts) => parts.iter().flat_map(Sweep::keys).collect(),
        }
    }

    /// Expand into resolvers, in sweep order
    pub fn resolvers(&self) -> Vec<ParamResolver> {
        match self {
            Self::Unit => vec![ParamResolver::new()],
            Self::Points { key, values } => values
                .iter()
                .map(|&v| ParamResolver::new().with(key.clone(), v))
                .collect(),
            Self::Linspace {
                key,
                start,
                stop,
                length,
            } => (0..*length)
                .map(|i| {
                    let v = if *length == 1 {
                        *start
                    } else {
                        start + (stop - start) * i as f64 / (*length - 1) as f64
                    };
                    ParamResolver::new().with(key.clone(), v)
                })
                .collect(),
            Self::Product(factors) => {
                factors.iter().fold(vec![ParamResolver::new()], |acc, factor| {
                    let inner = factor.resolvers();
                    acc.iter()
                        .flat_map(|outer| inner.iter().map(move |r| outer.clone().merged(r)))
                        .collect()
                })
            },
            Self::Zip(parts) => {
                let expanded: Vec<Vec<ParamResolver>> = parts.iter().map(Sweep::resolvers).collect();
                (0..self.len())
                    .map(|i| {
                        expanded
                            .iter()
                            .fold(ParamResolver::new(), |acc, part| acc.merged(&part[i]))
                    })
                    .collect()
            },
        }
    }
}

impl From<ParamResolver> for Sweep {
    fn from(resolver: ParamResolver) -> Self {
        Self::Zip(
            resolver
                .iter()
                .map(|(name, value)| Sweep::points(name, vec![value]))
                .collect(),
        )
    }
}
