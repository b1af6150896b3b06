//! Quantum noise channels
//!
//! Every channel resolves to a [`ChannelForm`]: either a mixture of
//! unitaries, which a pure-state engine can sample branch by branch, or a
//! general Kraus decomposition, which only the density-matrix engine applies
//! exactly.
//!
//! - **Bit/phase flip, depolarizing**: random Pauli errors (mixtures)
//! - **Amplitude damping**: energy relaxation (T1 decay)
//! - **Phase damping**: dephasing without energy loss
//! - **Reset**: non-unitary return to |0⟩
//!
//! # Usage
//!
//! ```
//! use qmoment_core::noise::{AmplitudeDamping, Depolarizing, NoiseChannel};
//! use qmoment_core::ParamResolver;
//!
//! // 1% depolarizing error after each gate
//! let depol = Depolarizing::new(0.01);
//! let form = depol.channel_form(&ParamResolver::new()).unwrap();
//! assert_eq!(form.num_qubits(), 1);
//!
//! let damping = AmplitudeDamping::from_t1(50.0, 1.0).unwrap();
//! assert_eq!(damping.name(), "amplitude_damp");
//! ```

pub mod channels;
pub mod types;

pub use channels::{
    AmplitudeDamping, AsymmetricDepolarizing, BitFlip, Depolarizing, GeneralizedAmplitudeDamping,
    KrausChannel, MixtureChannel, PhaseDamping, PhaseFlip, Reset,
};
pub use types::{satisfies_completeness, ChannelForm, NoiseChannel, CHANNEL_TOLERANCE};
