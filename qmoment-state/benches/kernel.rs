//! Benchmarks for the shared contraction kernel
//!
//! Compares serial and block-parallel application on both representations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qmoment_core::{Complex64, Matrix};
use qmoment_state::{DensityMatrix, StateVector};

fn hadamard_matrix() -> Matrix {
    let inv_sqrt2 = 1.0 / 2.0_f64.sqrt();
    Matrix::from_2x2(
        Complex64::new(inv_sqrt2, 0.0),
        Complex64::new(inv_sqrt2, 0.0),
        Complex64::new(inv_sqrt2, 0.0),
        Complex64::new(-inv_sqrt2, 0.0),
    )
}

fn cnot_matrix() -> Matrix {
    let (o, l) = (Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0));
    Matrix::from_array(&[[l, o, o, o], [o, l, o, o], [o, o, o, l], [o, o, l, o]])
}

fn bench_state_vector_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_vector_kernel");
    let h = hadamard_matrix();
    let cx = cnot_matrix();

    for num_qubits in [10, 15, 20].iter() {
        group.throughput(Throughput::Elements(1u64 << num_qubits));

        for (label, threshold) in [("serial", usize::MAX), ("parallel", 0)] {
            group.bench_with_input(
                BenchmarkId::new(format!("single_qubit_{}", label), num_qubits),
                num_qubits,
                |b, &n| {
                    let mut state = StateVector::<f32>::new(n).unwrap();
                    b.iter(|| state.apply_matrix(black_box(&h), &[n / 2], threshold).unwrap());
                },
            );

            group.bench_with_input(
                BenchmarkId::new(format!("two_qubit_{}", label), num_qubits),
                num_qubits,
                |b, &n| {
                    let mut state = StateVector::<f32>::new(n).unwrap();
                    b.iter(|| state.apply_matrix(black_box(&cx), &[0, n - 1], threshold).unwrap());
                },
            );
        }
    }

    group.finish();
}

fn bench_density_matrix_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("density_matrix_kernel");
    let h = hadamard_matrix();

    for num_qubits in [4, 7, 10].iter() {
        group.throughput(Throughput::Elements(1u64 << (2 * num_qubits)));

        group.bench_with_input(BenchmarkId::from_parameter(num_qubits), num_qubits, |b, &n| {
            let mut rho = DensityMatrix::<f64>::new(n).unwrap();
            b.iter(|| rho.apply_unitary(black_box(&h), &[0], 14).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_state_vector_kernel, bench_density_matrix_kernel);
criterion_main!(benches);
