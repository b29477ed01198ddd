//! Whole-mechanism and per-reaction rate evaluation.

use crate::adapter::{KineticsScratch, RateKernelAdapter};
use crate::error::{KineticsError, KineticsResult};
use crate::kernel::{KernelBasis, RateProvider};
use crate::mechanism_kernel::MechanismKernel;
use qc_core::{SMALL, VSMALL};
use qc_mechanism::{ChemistryModel, Reaction, Reversibility, SpecieCoeff, Specie, validate_model};
use std::fmt;
use std::sync::Arc;

/// Rate of one reaction at a given state.
///
/// `net = pf * cf - pr * cr`. `cf` and `cr` are the limited concentrations
/// of the limiter species `l_ref` and `r_ref`; `pf` and `pr` hold the rate
/// constant times every other concentration factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReactionRate {
    pub net: f64,
    pub pf: f64,
    pub cf: f64,
    pub l_ref: usize,
    pub pr: f64,
    pub cr: f64,
    /// `None` for a reaction without products
    pub r_ref: Option<usize>,
}

impl ReactionRate {
    /// Forward molar rate `pf * cf`.
    pub fn forward(&self) -> f64 {
        self.pf * self.cf
    }

    /// Reverse molar rate `pr * cr`.
    pub fn reverse(&self) -> f64 {
        self.pr * self.cr
    }
}

/// Limited concentration `max(c, 0)`.
#[inline]
pub(crate) fn limited(c: f64) -> f64 {
    c.max(0.0)
}

/// Position within `side` of the limiter species: the smallest limited
/// concentration, the lowest species index on ties.
fn limiter(side: &[SpecieCoeff], c: &[f64]) -> usize {
    let mut s_ref = 0;
    for (s, sc) in side.iter().enumerate().skip(1) {
        let ci = limited(c[sc.index]);
        let c_ref = limited(c[side[s_ref].index]);
        if ci < c_ref || (ci == c_ref && sc.index < side[s_ref].index) {
            s_ref = s;
        }
    }
    s_ref
}

/// Whether a sub-unity-order limiter with an exhausted concentration
/// switches this side off.
fn is_cut(side: &[SpecieCoeff], c: &[f64]) -> bool {
    let reference = side[limiter(side, c)];
    reference.exponent < 1.0 && limited(c[reference.index]) <= SMALL
}

/// Split `k * Π max(c,0)^e` of one side into `(p, c_ref, ref)` with
/// `p * c_ref` equal to the full product.
fn limit_side(k: f64, side: &[SpecieCoeff], c: &[f64]) -> (f64, f64, usize) {
    let s_ref = limiter(side, c);

    let mut p = k;
    for (s, sc) in side.iter().enumerate() {
        if s != s_ref {
            p *= limited(c[sc.index]).powf(sc.exponent);
        }
    }

    let reference = side[s_ref];
    let c_ref = limited(c[reference.index]);
    let exp = reference.exponent;
    if exp < 1.0 {
        if c_ref > SMALL {
            p *= c_ref.powf(exp - 1.0);
        } else {
            p = 0.0;
        }
    } else {
        p *= c_ref.powf(exp - 1.0);
    }
    (p, c_ref, reference.index)
}

/// Rate of `reaction` at `(c, t)`. Indices must already be validated.
pub(crate) fn reaction_rate(reaction: &Reaction, species: &[Specie], c: &[f64], t: f64) -> ReactionRate {
    let kf = reaction.kf(t, c);
    let kr = reaction.kr(kf, t, c, species);

    let (pf, cf, l_ref) = limit_side(kf, reaction.lhs(), c);
    let (pr, cr, r_ref) = if reaction.rhs().is_empty() {
        (0.0, 0.0, None)
    } else {
        let (pr, cr, r_ref) = limit_side(kr, reaction.rhs(), c);
        (pr, cr, Some(r_ref))
    };

    ReactionRate {
        net: pf * cf - pr * cr,
        pf,
        cf,
        l_ref,
        pr,
        cr,
        r_ref,
    }
}

/// Derivative of `max(c, 0)^e` with respect to `c`.
///
/// Zero where the limited value is pinned at 0, except for a first-order
/// factor, which keeps its one-sided slope of 1 at exactly `c = 0`.
#[inline]
fn limited_power_derivative(c: f64, e: f64) -> f64 {
    if c > 0.0 {
        e * c.powf(e - 1.0)
    } else if c == 0.0 && e == 1.0 {
        1.0
    } else {
        0.0
    }
}

/// Concentration product `Π max(c, 0)^e` of one side, zero when cut.
fn side_product(side: &[SpecieCoeff], c: &[f64]) -> f64 {
    let (p, c_ref, _) = limit_side(1.0, side, c);
    p * c_ref
}

/// Add `scale * ∂(Π max(c,0)^e)/∂c_j` into `dprod`.
fn add_side_derivative(side: &[SpecieCoeff], c: &[f64], scale: f64, dprod: &mut [f64]) {
    if scale == 0.0 || is_cut(side, c) {
        return;
    }
    for (s, sc) in side.iter().enumerate() {
        let d = limited_power_derivative(c[sc.index], sc.exponent);
        if d == 0.0 {
            continue;
        }
        let others: f64 = side
            .iter()
            .enumerate()
            .filter(|(t, _)| *t != s)
            .map(|(_, other)| limited(c[other.index]).powf(other.exponent))
            .product();
        dprod[sc.index] += scale * d * others;
    }
}

/// Rate constants without the third-body factor.
fn bare_rate_constants(reaction: &Reaction, species: &[Specie], t: f64) -> (f64, f64) {
    let kf = reaction.forward().k(t);
    let kr = match reaction.reverse() {
        Reversibility::Irreversible => 0.0,
        Reversibility::Explicit(reverse) => reverse.k(t),
        Reversibility::Equilibrium => kf / reaction.kc(t, species).max(VSMALL),
    };
    (kf, kr)
}

/// Add `∂net/∂c_j` of `reaction` into `dnet`.
pub(crate) fn reaction_rate_derivative(
    reaction: &Reaction,
    species: &[Specie],
    c: &[f64],
    t: f64,
    dnet: &mut [f64],
) {
    let (kf, kr) = bare_rate_constants(reaction, species, t);
    let m = reaction.third_body_concentration(c);

    add_side_derivative(reaction.lhs(), c, m * kf, dnet);
    if !reaction.rhs().is_empty() {
        add_side_derivative(reaction.rhs(), c, -m * kr, dnet);
    }

    if let Some(tb) = reaction.third_body() {
        let forward = kf * side_product(reaction.lhs(), c);
        let reverse = if reaction.rhs().is_empty() {
            0.0
        } else {
            kr * side_product(reaction.rhs(), c)
        };
        let bare_net = forward - reverse;
        if bare_net != 0.0 {
            for (j, d) in dnet.iter_mut().enumerate() {
                if c[j] >= 0.0 {
                    *d += bare_net * tb.efficiency(j);
                }
            }
        }
    }
}

/// Production-rate evaluator over a chemistry model and a rate provider.
pub struct ReactionRateEvaluator<M: ChemistryModel> {
    model: Arc<M>,
    adapter: RateKernelAdapter,
    mirrors_mechanism: bool,
}

impl<M: ChemistryModel> fmt::Debug for ReactionRateEvaluator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionRateEvaluator")
            .field("n_species", &self.model.n_species())
            .field("n_reactions", &self.model.n_reactions())
            .field("adapter", &self.adapter)
            .field("mirrors_mechanism", &self.mirrors_mechanism)
            .finish()
    }
}

impl<M: ChemistryModel> ReactionRateEvaluator<M> {
    /// Validate the model and bind it to `provider`.
    pub fn new(model: Arc<M>, provider: Box<dyn RateProvider>) -> KineticsResult<Self> {
        validate_model(model.as_ref())?;
        let mirrors_mechanism = match provider.mirrored_reactions() {
            Some(n) if n != model.n_reactions() => {
                return Err(KineticsError::Configuration {
                    what: format!(
                        "rate provider evaluates {n} reactions, model has {}",
                        model.n_reactions()
                    ),
                });
            }
            Some(_) => true,
            None => false,
        };
        let adapter = RateKernelAdapter::new(provider, model.molar_masses())?;
        tracing::debug!(
            n_species = model.n_species(),
            n_reactions = model.n_reactions(),
            basis = ?adapter.basis(),
            mirrors_mechanism,
            "rate evaluator ready"
        );
        Ok(Self {
            model,
            adapter,
            mirrors_mechanism,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn adapter(&self) -> &RateKernelAdapter {
        &self.adapter
    }

    pub fn n_species(&self) -> usize {
        self.model.n_species()
    }

    pub fn n_reactions(&self) -> usize {
        self.model.n_reactions()
    }

    /// Whether bulk rates are exactly the stoichiometric sum of the model's
    /// per-reaction rates.
    pub fn mirrors_mechanism(&self) -> bool {
        self.mirrors_mechanism
    }

    pub fn basis(&self) -> KernelBasis {
        self.adapter.basis()
    }

    pub fn scratch(&self) -> KineticsScratch {
        self.adapter.scratch()
    }

    /// Bulk production rates [kmol/(m³ s)] into `out`.
    pub fn omega_into(
        &self,
        c: &[f64],
        t: f64,
        p: f64,
        scratch: &mut KineticsScratch,
        out: &mut [f64],
    ) -> KineticsResult<()> {
        self.adapter.rates(p, t, c, scratch, out)
    }

    /// Bulk production rates [kmol/(m³ s)].
    pub fn omega(&self, c: &[f64], t: f64, p: f64) -> KineticsResult<Vec<f64>> {
        let mut scratch = self.scratch();
        let mut out = vec![0.0; self.n_species()];
        self.omega_into(c, t, p, &mut scratch, &mut out)?;
        Ok(out)
    }

    fn check_state(&self, c: &[f64], t: f64) -> KineticsResult<()> {
        if c.len() != self.n_species() {
            return Err(KineticsError::KernelMismatch {
                what: "concentrations",
                expected: self.n_species(),
                found: c.len(),
            });
        }
        if !t.is_finite() {
            return Err(KineticsError::NonFinite {
                what: "temperature",
                value: t,
            });
        }
        if t <= 0.0 {
            return Err(KineticsError::NonPhysical {
                what: "temperature",
                value: t,
            });
        }
        Ok(())
    }

    /// Rate of one reaction with its limiter bookkeeping.
    ///
    /// `reaction` need not belong to the model but must only reference the
    /// model's species. Pressure does not enter the concentration-based rate
    /// expressions.
    pub fn omega_reaction(
        &self,
        reaction: &Reaction,
        c: &[f64],
        t: f64,
        _p: f64,
    ) -> KineticsResult<ReactionRate> {
        reaction.validate(self.n_species())?;
        self.check_state(c, t)?;
        Ok(reaction_rate(reaction, self.model.species(), c, t))
    }

    /// Rate of the model's reaction `index`.
    pub fn omega_i(&self, index: usize, c: &[f64], t: f64, _p: f64) -> KineticsResult<ReactionRate> {
        let reaction = self.model.reactions().get(index).ok_or(
            qc_mechanism::MechanismError::ReactionIndexOob {
                index,
                n_reactions: self.n_reactions(),
            },
        )?;
        self.check_state(c, t)?;
        Ok(reaction_rate(reaction, self.model.species(), c, t))
    }
}

impl<M: ChemistryModel + 'static> ReactionRateEvaluator<M> {
    /// Evaluator whose bulk rates come from the model's own reactions.
    pub fn with_mechanism_kernel(model: Arc<M>) -> KineticsResult<Self> {
        let kernel = MechanismKernel::new(Arc::clone(&model));
        Self::new(model, Box::new(kernel))
    }
}
