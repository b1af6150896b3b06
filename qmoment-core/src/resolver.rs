//! Symbol-to-value mappings

use crate::{QuantumError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maps symbol names to numeric values
///
/// Resolution is a pure lookup: the same resolver can be shared across any
/// number of operations, circuits and threads.
///
/// # Example
/// ```
/// use qmoment_core::ParamResolver;
///
/// let resolver = ParamResolver::new().with("x", 0.5).with("y", 1.0);
/// assert_eq!(resolver.resolve("x").unwrap(), 0.5);
/// assert!(resolver.resolve("z").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamResolver {
    values: BTreeMap<String, f64>,
}

impl ParamResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add or replace a value
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Add or replace a value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    /// Look up a symbol
    ///
    /// # Errors
    /// Returns `UnresolvedParameter` if `name` has no value.
    pub fn resolve(&self, name: &str) -> Result<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| QuantumError::unresolved(name))
    }

    /// Look up a symbol without failing
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Whether the resolver has a value for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of symbols with values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the resolver is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (name, value) pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Merge another resolver into this one; `other` wins on conflicts
    pub fn merged(mut self, other: &ParamResolver) -> Self {
        for (name, value) in other.iter() {
            self.values.insert(name.to_string(), value);
        }
        self
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ParamResolver {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for ParamResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}
