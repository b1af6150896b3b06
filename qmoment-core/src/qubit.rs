//! Qubit identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, totally ordered qubit identity
///
/// Qubits carry no behavior; they only address operations and fix the
/// default axis order of a simulation. The derived ordering sorts line
/// qubits before grid qubits before named qubits, and within each kind by
/// coordinate or name.
///
/// # Example
/// ```
/// use qmoment_core::Qubit;
///
/// let a = Qubit::line(0);
/// let b = Qubit::line(1);
/// assert!(a < b);
/// assert!(Qubit::grid(0, 5) < Qubit::grid(1, 0));
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Qubit {
    /// A qubit on a line, addressed by index
    Line(usize),
    /// A qubit on a 2D grid, addressed by (row, col)
    Grid(i32, i32),
    /// A qubit addressed by name
    Named(String),
}

impl Qubit {
    /// Create a line qubit
    #[inline]
    pub const fn line(index: usize) -> Self {
        Self::Line(index)
    }

    /// Create a grid qubit
    #[inline]
    pub const fn grid(row: i32, col: i32) -> Self {
        Self::Grid(row, col)
    }

    /// Create a named qubit
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// `n` consecutive line qubits starting at zero
    pub fn line_range(n: usize) -> Vec<Self> {
        (0..n).map(Self::Line).collect()
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(i) => write!(f, "q({})", i),
            Self::Grid(r, c) => write!(f, "q({}, {})", r, c),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

impl From<usize> for Qubit {
    #[inline]
    fn from(index: usize) -> Self {
        Self::Line(index)
    }
}

impl From<&str> for Qubit {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_equality() {
        assert_eq!(Qubit::line(0), Qubit::line(0));
        assert_ne!(Qubit::line(0), Qubit::line(1));
        assert_ne!(Qubit::named("a"), Qubit::named("b"));
    }

    #[test]
    fn test_qubit_ordering() {
        let mut qubits = vec![
            Qubit::named("b"),
            Qubit::grid(1, 0),
            Qubit::line(2),
            Qubit::named("a"),
            Qubit::grid(0, 3),
            Qubit::line(0),
        ];
        qubits.sort();
        assert_eq!(
            qubits,
            vec![
                Qubit::line(0),
                Qubit::line(2),
                Qubit::grid(0, 3),
                Qubit::grid(1, 0),
                Qubit::named("a"),
                Qubit::named("b"),
            ]
        );
    }

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", Qubit::line(5)), "q(5)");
        assert_eq!(format!("{}", Qubit::grid(1, 2)), "q(1, 2)");
        assert_eq!(format!("{}", Qubit::named("q_flip")), "q_flip");
    }

    #[test]
    fn test_qubit_from() {
        let q: Qubit = 5.into();
        assert_eq!(q, Qubit::line(5));
        let n: Qubit = "anc".into();
        assert_eq!(n, Qubit::named("anc"));
    }

    #[test]
    fn test_line_range() {
        assert_eq!(Qubit::line_range(3), vec![Qubit::line(0), Qubit::line(1), Qubit::line(2)]);
    }
}
