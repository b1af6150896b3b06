//! Floating-point precision of simulated amplitudes

use num_complex::{Complex, Complex64};
use num_traits::{Float, FloatConst};
use qmoment_core::Matrix;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Real scalar type of a simulation's complex amplitudes
///
/// `f32` is the default, narrower width; `f64` trades memory for accuracy.
/// Gate matrices are always built in `f64` and narrowed when applied.
pub trait Real:
    Float + FloatConst + Sum + Default + Debug + Display + Send + Sync + Serialize + 'static
{
    /// Tolerance for normalization and invariant checks at this width
    const DEFAULT_TOLERANCE: f64;

    /// Human-readable name, for logs
    const NAME: &'static str;

    fn of(value: f64) -> Self;

    fn as_f64(self) -> f64;
}

impl Real for f32 {
    const DEFAULT_TOLERANCE: f64 = 1e-4;
    const NAME: &'static str = "complex64";

    #[inline]
    fn of(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Real for f64 {
    const DEFAULT_TOLERANCE: f64 = 1e-10;
    const NAME: &'static str = "complex128";

    #[inline]
    fn of(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

/// Narrow (or keep) a double-precision complex number
#[inline]
pub fn cast<T: Real>(z: Complex64) -> Complex<T> {
    Complex::new(T::of(z.re), T::of(z.im))
}

/// Widen a complex number to double precision
#[inline]
pub fn widen<T: Real>(z: Complex<T>) -> Complex64 {
    Complex64::new(z.re.as_f64(), z.im.as_f64())
}

/// Row-major entries of a matrix at precision `T`
pub fn cast_matrix<T: Real>(m: &Matrix) -> Vec<Complex<T>> {
    m.data().iter().map(|&z| cast(z)).collect()
}

/// Row-major entries of the element-wise conjugate at precision `T`
pub fn cast_matrix_conj<T: Real>(m: &Matrix) -> Vec<Complex<T>> {
    m.data().iter().map(|z| cast(z.conj())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_roundtrip() {
        let z = Complex64::new(0.25, -0.5);
        assert_eq!(widen(cast::<f32>(z)), z);
        assert_eq!(widen(cast::<f64>(z)), z);
    }

    #[test]
    fn test_tolerances_ordered() {
        assert!(<f32 as Real>::DEFAULT_TOLERANCE > <f64 as Real>::DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_cast_matrix_conj() {
        let m = Matrix::from_2x2(
            Complex64::new(0.0, 1.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
        );
        let conj = cast_matrix_conj::<f64>(&m);
        assert_eq!(conj[0], Complex::new(0.0, -1.0));
    }
}
