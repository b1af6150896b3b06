//! Moment-by-moment quantum circuit simulator
//!
//! This crate provides the simulation engines for qmoment: a state-vector
//! engine for pure states and a density-matrix engine for mixed states,
//! both driven one moment at a time over a circuit whose parameters have
//! been resolved and whose qubits have been mapped to tensor axes.
//!
//! # Features
//!
//! - **Two engines**: [`StateVectorSimulator`] samples mixtures per
//!   repetition; [`DensityMatrixSimulator`] applies every channel exactly
//! - **Two precisions**: `f32` amplitudes by default, `f64` on request
//! - **Sweeps**: one [`RunResult`] per parameter assignment, with
//!   repetitions run in parallel on rayon and reproducible from one seed
//! - **Moment stepping**: inspect or overwrite the state between moments
//!   with [`MomentSteps`]
//! - **Cancellation**: a [`CancellationToken`] stops units between moments
//!
//! # Example
//!
//! ```
//! use qmoment_core::{Circuit, Operation, ParamResolver, Param, Qubit, Sweep};
//! use qmoment_sim::{SimulatorConfig, StateVectorSimulator};
//! use std::sync::Arc;
//!
//! let q = Qubit::line(0);
//! let circuit = Circuit::from_operations(vec![
//!     Operation::gate(Arc::new(qmoment_gates::x_pow(Param::symbol("x"))), &[q.clone()]).unwrap(),
//!     Operation::measure("m", &[q]).unwrap(),
//! ]);
//!
//! let sim = StateVectorSimulator::<f32>::new(SimulatorConfig::new().with_seed(7)).unwrap();
//! let outcome = sim
//!     .run_study(&circuit, &Sweep::points("x", vec![0.0, 1.0]), 10)
//!     .unwrap();
//! let results = outcome.into_results().unwrap();
//! assert_eq!(results[0].histogram("m").unwrap()[&0], 10);
//! assert_eq!(results[1].histogram("m").unwrap()[&1], 10);
//! ```

pub mod backend;
pub mod cancellation;
pub mod config;
pub mod engine;
pub mod error;
pub mod prepared;
pub mod result;
pub mod simulator;
pub mod steps;

pub use backend::{Backend, DensityMatrixBackend, StateVectorBackend};
pub use cancellation::CancellationToken;
pub use config::{ErrorPolicy, SimulatorConfig};
pub use engine::Measurements;
pub use error::{Result, SimulatorError};
pub use prepared::{PreparedCircuit, PreparedOp};
pub use result::{bits_to_value, RunResult, SimulationTrialResult, SweepOutcome};
pub use simulator::{DensityMatrixSimulator, Simulator, StateVectorSimulator};
pub use steps::{MomentSteps, StepResult};
