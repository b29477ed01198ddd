//! Error types for ODE integration.

use qc_core::CoreError;
use thiserror::Error;

/// Errors that can occur while integrating an ODE system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OdeError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Unknown ODE solver '{name}' (expected one of: seulex, Rosenbrock12, EulerImplicit)")]
    UnknownSolver { name: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    /// The system's own derivative or Jacobian evaluation failed.
    #[error("System evaluation failed: {message}")]
    System { message: String },
}

pub type OdeResult<T> = Result<T, OdeError>;

impl From<CoreError> for OdeError {
    fn from(e: CoreError) -> Self {
        OdeError::InvalidArg {
            what: e.to_string(),
        }
    }
}
