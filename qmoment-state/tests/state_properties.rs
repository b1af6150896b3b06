//! Physical invariants of both state representations under random operations

use approx::assert_relative_eq;
use proptest::prelude::*;
use qmoment_core::{Complex64, Matrix};
use qmoment_state::{DensityMatrix, QuantumState, StateInput, StateVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// General single-qubit unitary from three Euler angles
fn euler(theta: f64, phi: f64, lambda: f64) -> Matrix {
    let (s, co) = (theta / 2.0).sin_cos();
    Matrix::from_2x2(
        c(co, 0.0),
        -Complex64::from_polar(s, lambda),
        Complex64::from_polar(s, phi),
        Complex64::from_polar(co, phi + lambda),
    )
}

fn cnot() -> Matrix {
    let o = c(0.0, 0.0);
    let l = c(1.0, 0.0);
    Matrix::from_array(&[[l, o, o, o], [o, l, o, o], [o, o, o, l], [o, o, l, o]])
}

fn amplitude_damping(gamma: f64) -> Vec<Matrix> {
    let o = c(0.0, 0.0);
    vec![
        Matrix::from_2x2(c(1.0, 0.0), o, o, c((1.0 - gamma).sqrt(), 0.0)),
        Matrix::from_2x2(o, c(gamma.sqrt(), 0.0), o, o),
    ]
}

#[derive(Debug, Clone)]
enum Step {
    Rotate { axis: usize, angles: (f64, f64, f64) },
    Entangle { control: usize, target: usize },
    Damp { axis: usize, gamma: f64 },
}

fn step(num_qubits: usize) -> impl Strategy<Value = Step> {
    let angle = -std::f64::consts::PI..std::f64::consts::PI;
    prop_oneof![
        (0..num_qubits, angle.clone(), angle.clone(), angle)
            .prop_map(|(axis, a, b, g)| Step::Rotate { axis, angles: (a, b, g) }),
        (0..num_qubits, 1..num_qubits).prop_map(move |(control, shift)| Step::Entangle {
            control,
            target: (control + shift) % num_qubits,
        }),
        (0..num_qubits, 0.0..1.0f64).prop_map(|(axis, gamma)| Step::Damp { axis, gamma }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn unitaries_preserve_norm(steps in prop::collection::vec(step(3), 1..20)) {
        let mut psi = StateVector::<f64>::new(3).unwrap();
        for s in &steps {
            match s {
                Step::Rotate { axis, angles: (a, b, g) } => {
                    psi.apply_matrix(&euler(*a, *b, *g), &[*axis], usize::MAX).unwrap();
                }
                Step::Entangle { control, target } => {
                    psi.apply_matrix(&cnot(), &[*control, *target], usize::MAX).unwrap();
                }
                Step::Damp { .. } => {}
            }
        }
        prop_assert!((psi.norm_squared() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn channels_preserve_density_matrix_invariants(steps in prop::collection::vec(step(3), 1..12)) {
        let mut rho = DensityMatrix::<f64>::new(3).unwrap();
        for s in &steps {
            match s {
                Step::Rotate { axis, angles: (a, b, g) } => {
                    rho.apply_unitary(&euler(*a, *b, *g), &[*axis], usize::MAX).unwrap();
                }
                Step::Entangle { control, target } => {
                    rho.apply_unitary(&cnot(), &[*control, *target], usize::MAX).unwrap();
                }
                Step::Damp { axis, gamma } => {
                    rho.apply_kraus(&amplitude_damping(*gamma), &[*axis], usize::MAX).unwrap();
                }
            }
        }
        prop_assert!(rho.validate(1e-9, true).is_ok());
        prop_assert!(rho.purity() <= 1.0 + 1e-9);
    }

    #[test]
    fn parallel_and_serial_kernels_agree(steps in prop::collection::vec(step(4), 1..10)) {
        let mut serial = StateVector::<f64>::new(4).unwrap();
        let mut parallel = serial.clone();
        for s in &steps {
            let (m, axes) = match s {
                Step::Rotate { axis, angles: (a, b, g) } => (euler(*a, *b, *g), vec![*axis]),
                Step::Entangle { control, target } => (cnot(), vec![*control, *target]),
                Step::Damp { .. } => continue,
            };
            serial.apply_matrix(&m, &axes, usize::MAX).unwrap();
            parallel.apply_matrix(&m, &axes, 0).unwrap();
        }
        for (a, b) in serial.amplitudes().iter().zip(parallel.amplitudes()) {
            prop_assert!((a - b).norm() < 1e-12);
        }
    }
}

#[test]
fn pure_evolution_matches_between_representations() {
    let mut psi = StateVector::<f64>::new(2).unwrap();
    let mut rho = DensityMatrix::<f64>::new(2).unwrap();
    let rotation = euler(0.7, 0.3, -1.1);

    psi.apply_matrix(&rotation, &[1], usize::MAX).unwrap();
    psi.apply_matrix(&cnot(), &[1, 0], usize::MAX).unwrap();
    rho.apply_unitary(&rotation, &[1], usize::MAX).unwrap();
    rho.apply_unitary(&cnot(), &[1, 0], usize::MAX).unwrap();

    let expected = DensityMatrix::from_state_vector(&psi);
    for (a, b) in expected.data().iter().zip(rho.data()) {
        assert!((a - b).norm() < 1e-12);
    }
    assert_relative_eq!(rho.purity(), 1.0, epsilon = 1e-12);
}

#[test]
fn measurement_collapses_both_representations() {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let hadamard = Matrix::from_2x2(c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0));
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..20 {
        let mut psi = StateVector::<f32>::new(2).unwrap();
        psi.apply_matrix(&hadamard, &[0], usize::MAX).unwrap();
        psi.apply_matrix(&cnot(), &[0, 1], usize::MAX).unwrap();
        let mut rho = DensityMatrix::from_state_vector(&psi);

        let bits = psi.measure(&[0, 1], &mut rng).unwrap();
        assert_eq!(bits[0], bits[1]);
        let bits = rho.measure(&[1], &mut rng).unwrap();
        let expected = if bits[0] { 3 } else { 0 };
        assert_relative_eq!(rho.probabilities()[expected], 1.0, epsilon = 1e-5);
    }
}

#[test]
fn set_from_replaces_state() {
    let mut psi = StateVector::<f32>::new(2).unwrap();
    psi.set_from(StateInput::Basis(3)).unwrap();
    assert_eq!(psi.probabilities()[3], 1.0);
    assert!(psi.set_from(StateInput::Basis(4)).is_err());

    let mut rho = DensityMatrix::<f32>::new(1).unwrap();
    rho.set_from(StateInput::Basis(1)).unwrap();
    assert_relative_eq!(rho.probabilities()[1], 1.0);
}
