//! Simulation result types

use crate::engine::Measurements;
use crate::error::{Result, SimulatorError};
use qmoment_core::{qubit_map, ParamResolver, Qubit};
use qmoment_state::{DensityMatrix, Real, StateVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Big-endian integer of a bit record: the first bit is the most significant
pub fn bits_to_value(bits: &[bool]) -> u64 {
    bits.iter().fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
}

/// Measurement records of one parameter assignment across its repetitions
///
/// `records(key)[r][i]` is the bit measured on the key's `i`-th qubit in
/// repetition `r`. Repetitions are stored in execution order.
///
/// # Example
///
/// ```
/// use qmoment_core::{Circuit, Operation, ParamResolver, Qubit};
/// use qmoment_sim::StateVectorSimulator;
/// use std::sync::Arc;
///
/// let q = Qubit::line_range(2);
/// let circuit = Circuit::from_operations(vec![
///     Operation::gate(Arc::new(qmoment_gates::x()), &q[..1]).unwrap(),
///     Operation::measure("m", &q).unwrap(),
/// ]);
///
/// let result = StateVectorSimulator::<f32>::default()
///     .run(&circuit, &ParamResolver::new(), 3)
///     .unwrap();
/// assert_eq!(result.histogram("m").unwrap()[&0b10], 3);
/// assert_eq!(result.to_string(), "m=111, 000");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    params: ParamResolver,
    repetitions: usize,
    records: BTreeMap<String, Vec<Vec<bool>>>,
}

impl RunResult {
    /// An empty result with a record list for every key
    pub fn new(params: ParamResolver, keys: &[String]) -> Self {
        Self {
            params,
            repetitions: 0,
            records: keys.iter().map(|k| (k.clone(), Vec::new())).collect(),
        }
    }

    /// Append one repetition's measurements
    pub fn push_repetition(&mut self, measurements: Measurements) {
        for (key, bits) in measurements {
            self.records.entry(key).or_default().push(bits);
        }
        self.repetitions += 1;
    }

    /// The parameter assignment these repetitions ran with
    pub fn params(&self) -> &ParamResolver {
        &self.params
    }

    /// Number of recorded repetitions
    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// All repetitions of one key, in execution order
    pub fn records(&self, key: &str) -> Result<&[Vec<bool>]> {
        self.records
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| SimulatorError::UnknownMeasurementKey(key.to_string()))
    }

    /// Outcome frequencies of one key, with each outcome read as a
    /// big-endian integer
    pub fn histogram(&self, key: &str) -> Result<BTreeMap<u64, usize>> {
        let mut counts = BTreeMap::new();
        for bits in self.records(key)? {
            *counts.entry(bits_to_value(bits)).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Joint frequencies of several keys measured in the same repetition
    pub fn multi_measurement_histogram(&self, keys: &[&str]) -> Result<BTreeMap<Vec<u64>, usize>> {
        let columns = keys.iter().map(|k| self.records(k)).collect::<Result<Vec<_>>>()?;
        let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);
        let mut counts = BTreeMap::new();
        for r in 0..rows {
            let outcome: Vec<u64> = columns.iter().map(|c| bits_to_value(&c[r])).collect();
            *counts.entry(outcome).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// One `0`/`1` string per repetition
    pub fn bitstrings(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .records(key)?
            .iter()
            .map(|bits| bits.iter().map(|&b| if b { '1' } else { '0' }).collect())
            .collect())
    }

    /// Fraction of repetitions in which `key` read `value`
    pub fn probability(&self, key: &str, value: u64) -> Result<f64> {
        let records = self.records(key)?;
        if records.is_empty() {
            return Ok(0.0);
        }
        let hits = records.iter().filter(|bits| bits_to_value(bits) == value).count();
        Ok(hits as f64 / records.len() as f64)
    }

    /// Most frequent outcome of a key, if any repetition ran
    pub fn most_common(&self, key: &str) -> Result<Option<(u64, usize)>> {
        Ok(self
            .histogram(key)?
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0))))
    }
}

/// Each key on its own line: one string per measured qubit, one character
/// per repetition
impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, (key, records)) in self.records.iter().enumerate() {
            if n > 0 {
                writeln!(f)?;
            }
            write!(f, "{}=", key)?;
            let width = records.first().map_or(0, Vec::len);
            for i in 0..width {
                if i > 0 {
                    write!(f, ", ")?;
                }
                for bits in records {
                    let bit = bits.get(i).copied().unwrap_or(false);
                    write!(f, "{}", if bit { '1' } else { '0' })?;
                }
            }
        }
        Ok(())
    }
}

/// Results of a sweep: one [`RunResult`] per resolver, in resolver order
///
/// Under [`ErrorPolicy::CollectPerUnit`](crate::ErrorPolicy) failed units
/// are listed in `failures` (each a `UnitFailed` carrying its position) and
/// the matching `RunResult` holds only the repetitions that succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub results: Vec<RunResult>,
    pub failures: Vec<SimulatorError>,
}

impl SweepOutcome {
    /// True if every unit succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The results, or the first failure in sweep order
    pub fn into_results(self) -> Result<Vec<RunResult>> {
        match self.failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.results),
        }
    }
}

/// Final state of one simulated repetition plus its measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrialResult<S> {
    pub params: ParamResolver,
    pub measurements: Measurements,
    pub qubit_order: Vec<Qubit>,
    pub final_state: S,
}

impl<S> SimulationTrialResult<S> {
    /// Axis of each qubit in the final state
    pub fn qubit_map(&self) -> BTreeMap<Qubit, usize> {
        qubit_map(&self.qubit_order).into_iter().collect()
    }

    fn axes_of(&self, qubits: &[Qubit]) -> Result<Vec<usize>> {
        let map = qubit_map(&self.qubit_order);
        qubits
            .iter()
            .map(|q| {
                map.get(q)
                    .copied()
                    .ok_or_else(|| SimulatorError::InvalidState(format!("qubit {} is not simulated", q)))
            })
            .collect()
    }
}

impl<T: Real> SimulationTrialResult<StateVector<T>> {
    /// Final state in ket notation
    pub fn dirac_notation(&self, decimals: usize) -> String {
        self.final_state.dirac_notation(decimals)
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.final_state.probabilities()
    }

    /// Bloch vector `(x, y, z)` of one qubit's reduced state
    pub fn bloch_vector(&self, qubit: &Qubit) -> Result<[f64; 3]> {
        let axes = self.axes_of(std::slice::from_ref(qubit))?;
        Ok(self.final_state.bloch_vector(axes[0])?)
    }

    /// Reduced density matrix of `qubits`, in the given order
    pub fn density_matrix_of(&self, qubits: &[Qubit]) -> Result<DensityMatrix<T>> {
        let axes = self.axes_of(qubits)?;
        Ok(DensityMatrix::from_state_vector(&self.final_state).reduced(&axes)?)
    }
}

impl<T: Real> SimulationTrialResult<DensityMatrix<T>> {
    pub fn probabilities(&self) -> Vec<f64> {
        self.final_state.probabilities()
    }

    pub fn purity(&self) -> f64 {
        self.final_state.purity()
    }

    /// Reduced density matrix of `qubits`, in the given order
    pub fn density_matrix_of(&self, qubits: &[Qubit]) -> Result<DensityMatrix<T>> {
        let axes = self.axes_of(qubits)?;
        Ok(self.final_state.reduced(&axes)?)
    }

    /// Trace out `qubits`, keeping the rest in simulation order
    pub fn partial_trace(&self, qubits: &[Qubit]) -> Result<DensityMatrix<T>> {
        let axes = self.axes_of(qubits)?;
        Ok(self.final_state.partial_trace(&axes)?)
    }
}

impl<S: fmt::Display> fmt::Display for SimulationTrialResult<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "measurements:")?;
        for (key, bits) in &self.measurements {
            let text: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
            writeln!(f, "  {}={}", key, text)?;
        }
        let order: Vec<String> = self.qubit_order.iter().map(Qubit::to_string).collect();
        writeln!(f, "qubits: [{}]", order.join(", "))?;
        write!(f, "final state: {}", self.final_state)
    }
}
