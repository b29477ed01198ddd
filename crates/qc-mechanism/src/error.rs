//! Mechanism definition errors.

use thiserror::Error;

/// Result type for mechanism operations.
pub type MechanismResult<T> = Result<T, MechanismError>;

/// Errors in the definition of a reaction mechanism.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MechanismError {
    /// A reaction refers to a species that does not exist.
    #[error("Reaction '{reaction}' references specie {index} but the mechanism has {n_species}")]
    SpecieIndexOob {
        reaction: String,
        index: usize,
        n_species: usize,
    },

    /// A reaction index is outside the reaction list.
    #[error("Reaction index {index} out of range (mechanism has {n_reactions} reactions)")]
    ReactionIndexOob { index: usize, n_reactions: usize },

    /// A species index used in a query is outside the species list.
    #[error("Specie index {index} out of range (mechanism has {n_species} species)")]
    SpecieOutOfRange { index: usize, n_species: usize },

    /// Malformed species data.
    #[error("Invalid specie '{name}': {what}")]
    InvalidSpecie { name: String, what: &'static str },

    /// Malformed reaction data.
    #[error("Invalid reaction '{name}': {what}")]
    InvalidReaction { name: String, what: &'static str },

    /// Non-physical state passed to a thermodynamic query.
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },
}
