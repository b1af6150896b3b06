//! Tensor contraction of small matrices against state axes
//!
//! A state over `n` axes is a flat buffer of `2^n` amplitudes in big-endian
//! axis order: axis `a` is bit `n - 1 - a` of the flat index. A density
//! matrix is the same buffer over `2n` axes, rows first, so one kernel
//! serves both representations.

use crate::precision::Real;
use num_complex::Complex;
use rayon::prelude::*;

/// Flat-index bit position of an axis
#[inline]
pub fn bit_position(num_axes: usize, axis: usize) -> usize {
    num_axes - 1 - axis
}

/// Offset of each sub-index `m` of the target axes
///
/// The first target axis is the most significant bit of `m`, matching the
/// row/column convention of gate matrices.
pub fn axis_offsets(num_axes: usize, axes: &[usize]) -> Vec<usize> {
    let k = axes.len();
    (0..1usize << k)
        .map(|m| {
            axes.iter().enumerate().fold(0, |acc, (j, &axis)| {
                if (m >> (k - 1 - j)) & 1 == 1 {
                    acc | (1 << bit_position(num_axes, axis))
                } else {
                    acc
                }
            })
        })
        .collect()
}

/// Sub-index of the target axes encoded in a flat index
#[inline]
pub fn sub_index(index: usize, num_axes: usize, axes: &[usize]) -> usize {
    axes.iter()
        .fold(0, |acc, &axis| (acc << 1) | ((index >> bit_position(num_axes, axis)) & 1))
}

/// Spread a compact counter over the non-target bits
#[inline]
fn insert_zero_bits(mut value: usize, sorted_positions: &[usize]) -> usize {
    for &pos in sorted_positions {
        let low = value & ((1 << pos) - 1);
        value = ((value >> pos) << (pos + 1)) | low;
    }
    value
}

/// Apply a `2^k × 2^k` row-major matrix to `axes` of `data`
///
/// When `num_axes >= parallel_threshold`, independent blocks of the buffer
/// are processed on the rayon pool.
///
/// # Panics
/// Panics in debug builds if the buffer length is not `2^num_axes` or the
/// matrix size does not match the axis count.
pub fn apply_matrix<T: Real>(
    data: &mut [Complex<T>],
    num_axes: usize,
    matrix: &[Complex<T>],
    axes: &[usize],
    parallel_threshold: usize,
) {
    let k = axes.len();
    let dim = 1usize << k;
    debug_assert_eq!(data.len(), 1usize << num_axes);
    debug_assert_eq!(matrix.len(), dim * dim);
    if k == 0 {
        return;
    }

    let offsets = axis_offsets(num_axes, axes);
    let mut positions: Vec<usize> = axes.iter().map(|&a| bit_position(num_axes, a)).collect();
    positions.sort_unstable();
    let highest = positions[k - 1];

    // Every group of 2^k amplitudes lives inside one aligned block of this size
    let block = 1usize << (highest + 1);
    let groups_per_block = block >> k;

    let contract = |chunk: &mut [Complex<T>]| {
        let mut gathered = vec![Complex::new(T::zero(), T::zero()); dim];
        for g in 0..groups_per_block {
            let base = insert_zero_bits(g, &positions);
            for (m, &off) in offsets.iter().enumerate() {
                gathered[m] = chunk[base + off];
            }
            for (row, &off) in offsets.iter().enumerate() {
                let coefficients = &matrix[row * dim..(row + 1) * dim];
                chunk[base + off] = coefficients
                    .iter()
                    .zip(&gathered)
                    .fold(Complex::new(T::zero(), T::zero()), |acc, (&u, &a)| acc + u * a);
            }
        }
    };

    if num_axes >= parallel_threshold && block < data.len() {
        data.par_chunks_mut(block).for_each(contract);
    } else {
        data.chunks_mut(block).for_each(contract);
    }
}

/// Squared magnitude of each outcome of the target axes
pub fn outcome_weights<T: Real>(data: &[Complex<T>], num_axes: usize, axes: &[usize]) -> Vec<f64> {
    let mut weights = vec![0.0; 1 << axes.len()];
    for (index, amp) in data.iter().enumerate() {
        weights[sub_index(index, num_axes, axes)] += amp.norm_sqr().as_f64();
    }
    weights
}

/// Pick an index from non-negative weights using a uniform draw in [0, 1)
///
/// Weights need not be normalized. Zero-weight entries are never chosen.
pub fn sample_index(weights: &[f64], uniform: f64) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let target = uniform * total;
    let mut cumulative = 0.0;
    let mut last_nonzero = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_nonzero = Some(i);
        if target < cumulative {
            return Some(i);
        }
    }
    // Rounding can leave `target` just past the final cumulative sum
    last_nonzero
}

/// Decode a big-endian sub-index into one bit per target axis
pub fn outcome_bits(outcome: usize, k: usize) -> Vec<bool> {
    (0..k).map(|j| (outcome >> (k - 1 - j)) & 1 == 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    type C = Complex<f64>;

    fn c(re: f64, im: f64) -> C {
        Complex::new(re, im)
    }

    fn basis(n: usize, index: usize) -> Vec<C> {
        let mut v = vec![c(0.0, 0.0); 1 << n];
        v[index] = c(1.0, 0.0);
        v
    }

    const X: [C; 4] = [
        Complex { re: 0.0, im: 0.0 },
        Complex { re: 1.0, im: 0.0 },
        Complex { re: 1.0, im: 0.0 },
        Complex { re: 0.0, im: 0.0 },
    ];

    #[test]
    fn test_first_axis_is_most_significant() {
        let mut state = basis(2, 0);
        apply_matrix(&mut state, 2, &X, &[0], usize::MAX);
        assert_eq!(state[2], c(1.0, 0.0));

        let mut state = basis(2, 0);
        apply_matrix(&mut state, 2, &X, &[1], usize::MAX);
        assert_eq!(state[1], c(1.0, 0.0));
    }

    #[test]
    fn test_two_axis_matrix_respects_axis_order() {
        // CNOT with control on axis 2 and target on axis 0 of three axes
        let o = c(0.0, 0.0);
        let l = c(1.0, 0.0);
        let cnot = [l, o, o, o, o, l, o, o, o, o, o, l, o, o, l, o];
        let mut state = basis(3, 0b001);
        apply_matrix(&mut state, 3, &cnot, &[2, 0], usize::MAX);
        assert_eq!(state[0b101], l);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let n = 6;
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let hadamard = [c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)];
        let mut seq = basis(n, 13);
        let mut par = basis(n, 13);
        for axis in [0, 3, 5] {
            apply_matrix(&mut seq, n, &hadamard, &[axis], usize::MAX);
            apply_matrix(&mut par, n, &hadamard, &[axis], 0);
        }
        for (a, b) in seq.iter().zip(&par) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_offsets_and_sub_index() {
        assert_eq!(axis_offsets(3, &[2, 0]), vec![0, 4, 1, 5]);
        assert_eq!(sub_index(0b101, 3, &[2, 0]), 0b11);
        assert_eq!(sub_index(0b100, 3, &[2, 0]), 0b01);
        assert_eq!(outcome_bits(0b10, 2), vec![true, false]);
    }

    #[test]
    fn test_outcome_weights() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let state = vec![c(h, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, h)];
        let w = outcome_weights(&state, 2, &[1]);
        assert!((w[0] - 0.5).abs() < 1e-12);
        assert!((w[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sample_index() {
        let weights = [0.0, 0.2, 0.0, 0.8];
        assert_eq!(sample_index(&weights, 0.0), Some(1));
        assert_eq!(sample_index(&weights, 0.19), Some(1));
        assert_eq!(sample_index(&weights, 0.21), Some(3));
        assert_eq!(sample_index(&weights, 0.999_999_999), Some(3));
        assert_eq!(sample_index(&[0.0, 0.0], 0.5), None);
    }
}
