//! Validated reaction mechanism.

use crate::error::{MechanismError, MechanismResult};
use crate::model::{ChemistryModel, validate_model};
use crate::reaction::Reaction;
use crate::species::Specie;

/// Species and reactions of a reduced mechanism, validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Mechanism {
    species: Vec<Specie>,
    reactions: Vec<Reaction>,
}

impl Mechanism {
    /// Build a mechanism, rejecting out-of-range indices and malformed data.
    pub fn new(species: Vec<Specie>, reactions: Vec<Reaction>) -> MechanismResult<Self> {
        if species.is_empty() {
            return Err(MechanismError::InvalidSpecie {
                name: String::new(),
                what: "mechanism has no species",
            });
        }
        for (i, sp) in species.iter().enumerate() {
            if species[..i].iter().any(|other| other.name() == sp.name()) {
                return Err(MechanismError::InvalidSpecie {
                    name: sp.name().to_string(),
                    what: "duplicate species name",
                });
            }
        }
        let mechanism = Self { species, reactions };
        validate_model(&mechanism)?;
        Ok(mechanism)
    }

    /// Mechanism whose rates come only from an opaque kernel.
    pub fn species_only(species: Vec<Specie>) -> MechanismResult<Self> {
        Self::new(species, Vec::new())
    }

    pub fn specie_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name() == name)
    }

    pub fn reaction(&self, index: usize) -> MechanismResult<&Reaction> {
        self.reactions
            .get(index)
            .ok_or(MechanismError::ReactionIndexOob {
                index,
                n_reactions: self.reactions.len(),
            })
    }
}

impl ChemistryModel for Mechanism {
    fn species(&self) -> &[Specie] {
        &self.species
    }

    fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }
}
