//! Rate provider abstraction.

use crate::error::KineticsResult;

/// Units and composition basis a provider expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelBasis {
    /// Concentrations [kmol/m³], pressure [Pa], rates [kmol/(m³ s)].
    Concentration,
    /// CHEMKIN convention: mass fractions, pressure [dyn/cm²],
    /// rates [mol/(cm³ s)].
    MassFractionCgs,
}

/// Kernel-private integer and real work arrays.
///
/// Each workspace owns its own copy so concurrent evaluations never share
/// kernel scratch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KernelWork {
    pub ints: Vec<i32>,
    pub reals: Vec<f64>,
}

/// Source of net molar production rates for every transported species.
///
/// Implementations are stateless between calls apart from `work`.
pub trait RateProvider: Send + Sync {
    /// Number of species in `fractions` and `rates`.
    fn n_species(&self) -> usize;

    fn basis(&self) -> KernelBasis;

    /// Fresh work arrays for one workspace.
    fn new_work(&self) -> KernelWork {
        KernelWork::default()
    }

    /// Number of reactions when the provider evaluates exactly the model's
    /// reaction list, `None` for an opaque kernel.
    fn mirrored_reactions(&self) -> Option<usize> {
        None
    }

    /// Write net production rates into `rates`.
    ///
    /// Arguments are in the units of [`RateProvider::basis`]. Slice lengths
    /// have been checked by the caller.
    fn evaluate(
        &self,
        p: f64,
        t: f64,
        fractions: &mut [f64],
        work: &mut KernelWork,
        rates: &mut [f64],
    ) -> KineticsResult<()>;
}
