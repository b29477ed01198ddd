//! Error types for rate evaluation.

use qc_core::CoreError;
use qc_mechanism::MechanismError;
use thiserror::Error;

pub type KineticsResult<T> = Result<T, KineticsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KineticsError {
    /// Provider and model disagree, or an option is not supported.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    /// An array handed to the rate kernel has the wrong size.
    #[error("Kernel boundary mismatch for {what}: expected {expected}, found {found}")]
    KernelMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Mechanism(#[from] MechanismError),

    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },
}

impl From<CoreError> for KineticsError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, value } => KineticsError::NonFinite { what, value },
            CoreError::LengthMismatch {
                what,
                expected,
                found,
            } => KineticsError::KernelMismatch {
                what,
                expected,
                found,
            },
            other => KineticsError::Configuration {
                what: other.to_string(),
            },
        }
    }
}
