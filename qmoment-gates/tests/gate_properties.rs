//! Property tests for the gate library

use proptest::prelude::*;
use qmoment_core::{Gate, Matrix, Param, ParamResolver};
use qmoment_gates::{PowGate, PowKind};

fn kinds() -> impl Strategy<Value = PowKind> {
    prop_oneof![
        Just(PowKind::X),
        Just(PowKind::Y),
        Just(PowKind::Z),
        Just(PowKind::H),
        Just(PowKind::CZ),
        Just(PowKind::CNOT),
        Just(PowKind::SWAP),
    ]
}

proptest! {
    #[test]
    fn power_gates_are_unitary(kind in kinds(), t in -4.0f64..4.0, shift in -1.0f64..1.0) {
        let m = PowGate::new(kind, t).with_global_shift(shift).matrix_at(t);
        prop_assert!(m.is_unitary(1e-10));
    }

    #[test]
    fn exponents_add(kind in kinds(), a in -2.0f64..2.0, b in -2.0f64..2.0) {
        let gate = PowGate::new(kind, Param::symbol("t"));
        let product = gate.matrix_at(a).matmul(&gate.matrix_at(b));
        prop_assert!(product.approx_eq(&gate.matrix_at(a + b), 1e-10));
    }
}

#[test]
fn test_x_pow_sweep_points() {
    let gate = PowGate::new(PowKind::X, Param::symbol("x"));
    let at = |x: f64| gate.unitary(&ParamResolver::new().with("x", x)).unwrap();

    assert!(at(0.0).approx_eq(&Matrix::identity(2), 1e-12));
    assert!(at(1.0).approx_eq(&PowKind::X.base_matrix(), 1e-12));

    let half = at(0.5);
    for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        let z = half.get(row, col);
        assert!((z.re - 0.5).abs() < 1e-12);
        assert!((z.im.abs() - 0.5).abs() < 1e-12);
    }
}
