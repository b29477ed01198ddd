//! Pure-Rust rate provider evaluating the model's own reactions.

use crate::error::KineticsResult;
use crate::evaluator::reaction_rate;
use crate::kernel::{KernelBasis, KernelWork, RateProvider};
use qc_mechanism::ChemistryModel;
use std::sync::Arc;

/// Sums per-reaction net rates weighted by stoichiometry:
/// reactants lose `ν · net`, products gain `ν · net`.
#[derive(Debug)]
pub struct MechanismKernel<M> {
    model: Arc<M>,
}

impl<M: ChemistryModel> MechanismKernel<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }
}

impl<M: ChemistryModel> RateProvider for MechanismKernel<M> {
    fn n_species(&self) -> usize {
        self.model.n_species()
    }

    fn basis(&self) -> KernelBasis {
        KernelBasis::Concentration
    }

    fn mirrored_reactions(&self) -> Option<usize> {
        Some(self.model.n_reactions())
    }

    fn evaluate(
        &self,
        _p: f64,
        t: f64,
        fractions: &mut [f64],
        _work: &mut KernelWork,
        rates: &mut [f64],
    ) -> KineticsResult<()> {
        let c: &[f64] = fractions;
        let species = self.model.species();
        rates.fill(0.0);
        for reaction in self.model.reactions() {
            let net = reaction_rate(reaction, species, c, t).net;
            for sc in reaction.lhs() {
                rates[sc.index] -= sc.stoich_coeff * net;
            }
            for sc in reaction.rhs() {
                rates[sc.index] += sc.stoich_coeff * net;
            }
        }
        Ok(())
    }
}
