//! Reaction descriptors.

use crate::error::{MechanismError, MechanismResult};
use crate::species::Specie;
use qc_core::VSMALL;
use qc_core::constants::{P_STD, R_UNIVERSAL};

/// One species entry on a side of a reaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecieCoeff {
    /// Index into the mechanism's species list
    pub index: usize,
    /// Stoichiometric coefficient
    pub stoich_coeff: f64,
    /// Concentration exponent in the rate expression
    pub exponent: f64,
}

/// Modified Arrhenius rate constant `k = A T^beta exp(-Ta/T)`.
///
/// Units of `A` follow from kmol/m³ concentrations and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrhenius {
    pub a: f64,
    pub beta: f64,
    /// Activation temperature [K]
    pub ta: f64,
}

impl Arrhenius {
    pub fn new(a: f64, beta: f64, ta: f64) -> Self {
        Self { a, beta, ta }
    }

    pub fn k(&self, t: f64) -> f64 {
        let mut k = self.a;
        if self.beta != 0.0 {
            k *= t.powf(self.beta);
        }
        if self.ta != 0.0 {
            k *= (-self.ta / t).exp();
        }
        k
    }

    fn is_valid(&self) -> bool {
        self.a.is_finite() && self.a >= 0.0 && self.beta.is_finite() && self.ta.is_finite()
    }
}

/// How the reverse rate constant is obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reversibility {
    Irreversible,
    /// Explicit reverse Arrhenius parameters.
    Explicit(Arrhenius),
    /// `kr = kf / Kc` with Kc from species Gibbs energies.
    Equilibrium,
}

/// Third-body collision partner with per-species efficiencies.
#[derive(Debug, Clone, PartialEq)]
pub struct ThirdBody {
    pub default_efficiency: f64,
    /// Overrides as `(specie index, efficiency)`
    pub efficiencies: Vec<(usize, f64)>,
}

impl ThirdBody {
    /// All species count with efficiency 1.
    pub fn uniform() -> Self {
        Self {
            default_efficiency: 1.0,
            efficiencies: Vec::new(),
        }
    }

    pub fn with_efficiency(mut self, index: usize, efficiency: f64) -> Self {
        self.efficiencies.push((index, efficiency));
        self
    }

    /// Efficiency of one species.
    pub fn efficiency(&self, index: usize) -> f64 {
        self.efficiencies
            .iter()
            .rev()
            .find(|(i, _)| *i == index)
            .map(|(_, e)| *e)
            .unwrap_or(self.default_efficiency)
    }

    /// Effective third-body concentration `M = Σ eff_i max(c_i, 0)`.
    pub fn concentration(&self, c: &[f64]) -> f64 {
        c.iter()
            .enumerate()
            .map(|(i, ci)| self.efficiency(i) * ci.max(0.0))
            .sum()
    }
}

/// A single reaction of the reduced mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    name: String,
    lhs: Vec<SpecieCoeff>,
    rhs: Vec<SpecieCoeff>,
    forward: Arrhenius,
    reverse: Reversibility,
    third_body: Option<ThirdBody>,
}

impl Reaction {
    fn with_reverse(name: impl Into<String>, forward: Arrhenius, reverse: Reversibility) -> Self {
        Self {
            name: name.into(),
            lhs: Vec::new(),
            rhs: Vec::new(),
            forward,
            reverse,
            third_body: None,
        }
    }

    pub fn irreversible(name: impl Into<String>, forward: Arrhenius) -> Self {
        Self::with_reverse(name, forward, Reversibility::Irreversible)
    }

    pub fn reversible(name: impl Into<String>, forward: Arrhenius, reverse: Arrhenius) -> Self {
        Self::with_reverse(name, forward, Reversibility::Explicit(reverse))
    }

    /// Reversible reaction whose reverse rate follows from equilibrium.
    pub fn equilibrium(name: impl Into<String>, forward: Arrhenius) -> Self {
        Self::with_reverse(name, forward, Reversibility::Equilibrium)
    }

    /// Add a reactant whose rate order equals its stoichiometric coefficient.
    pub fn reactant(self, index: usize, stoich_coeff: f64) -> Self {
        self.reactant_with_order(index, stoich_coeff, stoich_coeff)
    }

    pub fn reactant_with_order(mut self, index: usize, stoich_coeff: f64, exponent: f64) -> Self {
        self.lhs.push(SpecieCoeff {
            index,
            stoich_coeff,
            exponent,
        });
        self
    }

    /// Add a product whose reverse rate order equals its stoichiometric coefficient.
    pub fn product(self, index: usize, stoich_coeff: f64) -> Self {
        self.product_with_order(index, stoich_coeff, stoich_coeff)
    }

    pub fn product_with_order(mut self, index: usize, stoich_coeff: f64, exponent: f64) -> Self {
        self.rhs.push(SpecieCoeff {
            index,
            stoich_coeff,
            exponent,
        });
        self
    }

    pub fn with_third_body(mut self, third_body: ThirdBody) -> Self {
        self.third_body = Some(third_body);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lhs(&self) -> &[SpecieCoeff] {
        &self.lhs
    }

    pub fn rhs(&self) -> &[SpecieCoeff] {
        &self.rhs
    }

    pub fn forward(&self) -> &Arrhenius {
        &self.forward
    }

    pub fn reverse(&self) -> &Reversibility {
        &self.reverse
    }

    pub fn third_body(&self) -> Option<&ThirdBody> {
        self.third_body.as_ref()
    }

    /// Third-body concentration, 1 when the reaction has no third body.
    pub fn third_body_concentration(&self, c: &[f64]) -> f64 {
        self.third_body
            .as_ref()
            .map_or(1.0, |tb| tb.concentration(c))
    }

    /// Forward rate constant including the third-body factor.
    pub fn kf(&self, t: f64, c: &[f64]) -> f64 {
        self.forward.k(t) * self.third_body_concentration(c)
    }

    /// Reverse rate constant including the third-body factor.
    ///
    /// `kf` is the value returned by [`Reaction::kf`] at the same state.
    pub fn kr(&self, kf: f64, t: f64, c: &[f64], species: &[Specie]) -> f64 {
        match &self.reverse {
            Reversibility::Irreversible => 0.0,
            Reversibility::Explicit(reverse) => reverse.k(t) * self.third_body_concentration(c),
            Reversibility::Equilibrium => kf / self.kc(t, species).max(VSMALL),
        }
    }

    /// Concentration-based equilibrium constant.
    pub fn kc(&self, t: f64, species: &[Specie]) -> f64 {
        let mut delta_g = 0.0;
        let mut delta_nu = 0.0;
        for sc in &self.rhs {
            delta_g += sc.stoich_coeff * species[sc.index].thermo().g(t);
            delta_nu += sc.stoich_coeff;
        }
        for sc in &self.lhs {
            delta_g -= sc.stoich_coeff * species[sc.index].thermo().g(t);
            delta_nu -= sc.stoich_coeff;
        }
        let kp = (-delta_g / (R_UNIVERSAL * t)).exp();
        kp * (P_STD / (R_UNIVERSAL * t)).powf(delta_nu)
    }

    /// Net stoichiometric coefficient of a species (products minus reactants).
    pub fn net_stoich(&self, specie: usize) -> f64 {
        let produced: f64 = self
            .rhs
            .iter()
            .filter(|sc| sc.index == specie)
            .map(|sc| sc.stoich_coeff)
            .sum();
        let consumed: f64 = self
            .lhs
            .iter()
            .filter(|sc| sc.index == specie)
            .map(|sc| sc.stoich_coeff)
            .sum();
        produced - consumed
    }

    /// Check indices and coefficients against a species count.
    pub fn validate(&self, n_species: usize) -> MechanismResult<()> {
        let invalid = |what| MechanismError::InvalidReaction {
            name: self.name.clone(),
            what,
        };
        if self.lhs.is_empty() {
            return Err(invalid("reaction has no reactants"));
        }
        if !matches!(self.reverse, Reversibility::Irreversible) && self.rhs.is_empty() {
            return Err(invalid("reversible reaction has no products"));
        }
        for sc in self.lhs.iter().chain(&self.rhs) {
            if sc.index >= n_species {
                return Err(MechanismError::SpecieIndexOob {
                    reaction: self.name.clone(),
                    index: sc.index,
                    n_species,
                });
            }
            if !sc.stoich_coeff.is_finite() || sc.stoich_coeff <= 0.0 {
                return Err(invalid("stoichiometric coefficient must be positive"));
            }
            if !sc.exponent.is_finite() || sc.exponent < 0.0 {
                return Err(invalid("concentration exponent must be non-negative"));
            }
        }
        if !self.forward.is_valid() {
            return Err(invalid("invalid forward Arrhenius parameters"));
        }
        if let Reversibility::Explicit(reverse) = &self.reverse {
            if !reverse.is_valid() {
                return Err(invalid("invalid reverse Arrhenius parameters"));
            }
        }
        if let Some(tb) = &self.third_body {
            if !tb.default_efficiency.is_finite() || tb.default_efficiency < 0.0 {
                return Err(invalid("third-body efficiency must be non-negative"));
            }
            for &(index, eff) in &tb.efficiencies {
                if index >= n_species {
                    return Err(MechanismError::SpecieIndexOob {
                        reaction: self.name.clone(),
                        index,
                        n_species,
                    });
                }
                if !eff.is_finite() || eff < 0.0 {
                    return Err(invalid("third-body efficiency must be non-negative"));
                }
            }
        }
        Ok(())
    }
}
