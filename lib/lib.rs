//! Markovian (Redfield) relaxation operators for excitonic energy transfer.
//!
//! Given a precomputed exciton eigenbasis of a multi-chromophore aggregate
//! and the frequency-domain response of the bath each chromophore couples to,
//! this crate assembles the operators that generate dissipative dynamics of
//! the reduced density matrix: the population-transfer rate matrix, the full
//! four-index relaxation tensor (optionally secularized), per-state
//! pure-dephasing rates, and the lineshape exponent used by spectroscopy
//! routines. Propagation of the density matrix itself is left to downstream
//! consumers.
//!
//! All frequencies, energies, and rates share the units of the caller's
//! Hamiltonian (cm⁻¹ in typical excitonic use).

#![allow(non_snake_case)]

use thiserror::Error as ThisError;

pub mod bath;
pub mod exciton;
pub mod tensor;

/// Errors raised while assembling relaxation quantities.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// The system must contain at least one exciton state.
    #[error("system must contain at least one exciton state")]
    EmptySystem,

    /// Eigenbasis arrays disagree on their dimensions.
    #[error("dimension-inconsistent eigenbasis arrays: {0}")]
    ShapeMismatch(String),

    /// The site-to-spectral-density assignment does not cover every site.
    #[error("bath assignment lists {got} site(s), eigenbasis has {expected}")]
    BathAssignment { got: usize, expected: usize },

    /// A spectral-density identifier is unknown to the evaluator.
    #[error("unknown spectral density id {id}; bath defines {count}")]
    UnknownSpectralDensity { id: usize, count: usize },

    /// A bath was constructed with unusable parameters.
    #[error("invalid bath: {0}")]
    InvalidBath(String),
}

pub type Result<T> = std::result::Result<T, Error>;
