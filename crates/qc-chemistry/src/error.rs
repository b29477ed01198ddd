//! Chemistry solver errors.

use qc_kinetics::KineticsError;
use qc_mechanism::MechanismError;
use qc_ode::OdeError;
use thiserror::Error;

pub type ChemResult<T> = Result<T, ChemistryError>;

#[derive(Error, Debug)]
pub enum ChemistryError {
    /// Malformed coefficients or an unsupported solver; raised at construction.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error(transparent)]
    Mechanism(#[from] MechanismError),

    #[error("Kernel boundary mismatch for {what}: expected {expected}, found {found}")]
    KernelMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// The stiff integration could not meet its tolerances.
    #[error("Chemistry integration failed to converge: {what}")]
    NonConvergence { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("State size mismatch: expected {expected} concentrations, found {found}")]
    StateSize { expected: usize, found: usize },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cell {cell}: {source}")]
    Cell {
        cell: usize,
        #[source]
        source: Box<ChemistryError>,
    },
}

impl From<KineticsError> for ChemistryError {
    fn from(e: KineticsError) -> Self {
        match e {
            KineticsError::Configuration { what } => ChemistryError::Configuration { what },
            KineticsError::KernelMismatch {
                what,
                expected,
                found,
            } => ChemistryError::KernelMismatch {
                what,
                expected,
                found,
            },
            KineticsError::Mechanism(m) => ChemistryError::Mechanism(m),
            e @ (KineticsError::NonFinite { .. } | KineticsError::NonPhysical { .. }) => {
                ChemistryError::Numeric {
                    what: e.to_string(),
                }
            }
        }
    }
}

impl From<OdeError> for ChemistryError {
    fn from(e: OdeError) -> Self {
        match e {
            OdeError::ConvergenceFailed { what } => ChemistryError::NonConvergence { what },
            e @ OdeError::UnknownSolver { .. } => ChemistryError::Configuration {
                what: e.to_string(),
            },
            OdeError::InvalidArg { what } => ChemistryError::InvalidArg { what },
            OdeError::Numeric { what } => ChemistryError::Numeric { what },
            OdeError::System { message } => ChemistryError::Numeric { what: message },
        }
    }
}
