use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qmoment_core::noise::Depolarizing;
use qmoment_core::{Circuit, Operation, ParamResolver, Qubit, QubitOrder};
use qmoment_gates as gates;
use qmoment_sim::{DensityMatrixSimulator, SimulatorConfig, StateVectorSimulator};
use std::sync::Arc;

fn create_layered_circuit(num_qubits: usize, depth: usize, noisy: bool) -> Circuit {
    let q = Qubit::line_range(num_qubits);
    let mut ops = Vec::with_capacity(num_qubits * depth * 2);

    for d in 0..depth {
        // Single qubit gates layer
        for (i, qubit) in q.iter().enumerate() {
            let gate = if (i + d) % 2 == 0 { gates::h() } else { gates::rz(0.5) };
            ops.push(Operation::gate(Arc::new(gate), &[qubit.clone()]).unwrap());
            if noisy {
                let channel = Arc::new(Depolarizing::new(0.01));
                ops.push(Operation::channel(channel, &[qubit.clone()]).unwrap());
            }
        }

        // Entangling layer
        for i in 0..num_qubits.saturating_sub(1) {
            if (i + d) % 2 == 0 {
                let pair = [q[i].clone(), q[i + 1].clone()];
                ops.push(Operation::gate(Arc::new(gates::cnot()), &pair).unwrap());
            }
        }
    }

    Circuit::from_operations(ops)
}

fn bench_state_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_vector");
    let sim = StateVectorSimulator::<f32>::new(SimulatorConfig::new().with_seed(1)).unwrap();

    for num_qubits in [10, 15, 20].iter() {
        let depth = 20;
        let circuit = create_layered_circuit(*num_qubits, depth, false);

        group.bench_with_input(
            BenchmarkId::new("layered", format!("{}q_d{}", num_qubits, depth)),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    sim.simulate(black_box(circuit), &QubitOrder::Default, &ParamResolver::new())
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_density_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("density_matrix");
    let sim = DensityMatrixSimulator::<f64>::new(SimulatorConfig::new().with_seed(1)).unwrap();

    for num_qubits in [4, 6, 8].iter() {
        let depth = 10;
        let circuit = create_layered_circuit(*num_qubits, depth, true);

        group.bench_with_input(
            BenchmarkId::new("noisy_layered", format!("{}q_d{}", num_qubits, depth)),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    sim.simulate(black_box(circuit), &QubitOrder::Default, &ParamResolver::new())
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_sweep_parallelism(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    let circuit = {
        let mut circuit = create_layered_circuit(8, 10, true);
        let measure = Operation::measure("m", &Qubit::line_range(8)).unwrap();
        circuit.push_moment(qmoment_core::Moment::new(vec![measure]).unwrap()).unwrap();
        circuit
    };

    for parallel in [false, true] {
        let config = SimulatorConfig::new().with_seed(3).with_parallel(parallel);
        let sim = StateVectorSimulator::<f32>::new(config).unwrap();
        group.bench_function(BenchmarkId::new("repetitions_1000", parallel), |b| {
            b.iter(|| sim.run(black_box(&circuit), &ParamResolver::new(), 1000).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_state_vector, bench_density_matrix, bench_sweep_parallelism);
criterion_main!(benches);
