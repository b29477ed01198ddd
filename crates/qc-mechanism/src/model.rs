//! Capability set the chemistry integrator is generic over.

use crate::error::MechanismResult;
use crate::reaction::Reaction;
use crate::species::Specie;

/// A chemistry model: transported species, reactions and their thermodynamics.
///
/// Implementations must be thread-safe (Send + Sync); a model is shared
/// read-only by every worker solving cells concurrently.
///
/// A model with an empty reaction list is valid: it describes a mechanism
/// whose rates only an opaque kernel can evaluate.
pub trait ChemistryModel: Send + Sync {
    fn species(&self) -> &[Specie];

    fn reactions(&self) -> &[Reaction];

    fn n_species(&self) -> usize {
        self.species().len()
    }

    fn n_reactions(&self) -> usize {
        self.reactions().len()
    }

    /// Molar masses [kg/kmol] in species order.
    fn molar_masses(&self) -> Vec<f64> {
        self.species().iter().map(Specie::molar_mass).collect()
    }
}

/// Validate every species and reaction of a model.
pub fn validate_model<M: ChemistryModel + ?Sized>(model: &M) -> MechanismResult<()> {
    for sp in model.species() {
        sp.validate()?;
    }
    let n = model.n_species();
    for r in model.reactions() {
        r.validate(n)?;
    }
    Ok(())
}
