//! Right-hand side and Jacobian of the coupled `[c, T, p]` system.

use crate::adapter::KineticsScratch;
use crate::error::{KineticsError, KineticsResult};
use crate::evaluator::{ReactionRateEvaluator, reaction_rate_derivative};
use nalgebra::DMatrix;
use qc_core::VSMALL;
use qc_mechanism::ChemistryModel;
use qc_ode::{FD_EPSILON, finite_difference_columns, perturbation};
use std::fmt;
use std::str::FromStr;

/// Species perturbation floor relative to the total concentration.
const SPECIES_FLOOR_FRACTION: f64 = 1e-3;
const SPECIES_FLOOR_MIN: f64 = 1e-20;
/// Temperature perturbation floor [K].
const TEMPERATURE_FLOOR: f64 = 1.0;

/// How the Jacobian's concentration block is obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JacobianMethod {
    /// Analytic when the provider mirrors the model's reactions, else finite differences.
    #[default]
    Auto,
    Analytic,
    FiniteDifference,
}

impl JacobianMethod {
    pub fn name(self) -> &'static str {
        match self {
            JacobianMethod::Auto => "auto",
            JacobianMethod::Analytic => "analytic",
            JacobianMethod::FiniteDifference => "finiteDifference",
        }
    }
}

impl fmt::Display for JacobianMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JacobianMethod {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(JacobianMethod::Auto),
            "analytic" => Ok(JacobianMethod::Analytic),
            "finiteDifference" => Ok(JacobianMethod::FiniteDifference),
            other => Err(KineticsError::Configuration {
                what: format!(
                    "unknown Jacobian method '{other}' (expected auto, analytic or finiteDifference)"
                ),
            }),
        }
    }
}

/// Builds `d[c, T, p]/dt` and its Jacobian from the rate evaluator.
///
/// Temperature follows the constant-pressure adiabatic energy balance
/// `dT/dt = -Σ h_i ω_i / Σ c_i cp_i`; pressure is constant.
#[derive(Debug)]
pub struct JacobianAssembler<M: ChemistryModel> {
    evaluator: ReactionRateEvaluator<M>,
    method: JacobianMethod,
}

impl<M: ChemistryModel> JacobianAssembler<M> {
    /// Resolve `method` against the evaluator's provider.
    pub fn new(evaluator: ReactionRateEvaluator<M>, method: JacobianMethod) -> KineticsResult<Self> {
        let method = match (method, evaluator.mirrors_mechanism()) {
            (JacobianMethod::Auto, true) => JacobianMethod::Analytic,
            (JacobianMethod::Auto, false) => JacobianMethod::FiniteDifference,
            (JacobianMethod::Analytic, false) => {
                return Err(KineticsError::Configuration {
                    what: "analytic Jacobian requested but the rate provider is opaque".to_string(),
                });
            }
            (m, _) => m,
        };
        Ok(Self { evaluator, method })
    }

    pub fn evaluator(&self) -> &ReactionRateEvaluator<M> {
        &self.evaluator
    }

    /// The resolved method, never `Auto`.
    pub fn method(&self) -> JacobianMethod {
        self.method
    }

    pub fn n_species(&self) -> usize {
        self.evaluator.n_species()
    }

    /// Length of the `[c, T, p]` state.
    pub fn n_eqns(&self) -> usize {
        self.n_species() + 2
    }

    fn check_len(&self, what: &'static str, found: usize) -> KineticsResult<()> {
        let expected = self.n_eqns();
        if found == expected {
            Ok(())
        } else {
            Err(KineticsError::KernelMismatch {
                what,
                expected,
                found,
            })
        }
    }

    /// `(Σ c_i cp_i, dT/dt)` given the species production rates.
    fn energy_balance(&self, c: &[f64], t: f64, omega: &[f64]) -> (f64, f64) {
        let species = self.evaluator.model().species();
        let mut cp_sum = 0.0;
        let mut heat = 0.0;
        for ((sp, ci), wi) in species.iter().zip(c).zip(omega) {
            let thermo = sp.thermo();
            cp_sum += ci * thermo.cp(t);
            heat += thermo.h(t) * wi;
        }
        if cp_sum <= VSMALL {
            (cp_sum, 0.0)
        } else {
            (cp_sum, -heat / cp_sum)
        }
    }

    /// Evaluate `dctp = f(ctp)`.
    pub fn derivatives(
        &self,
        _t: f64,
        ctp: &[f64],
        scratch: &mut KineticsScratch,
        dctp: &mut [f64],
    ) -> KineticsResult<()> {
        self.check_len("ODE state", ctp.len())?;
        self.check_len("ODE derivative", dctp.len())?;
        let n = self.n_species();
        let (c, tp) = ctp.split_at(n);
        let (temperature, pressure) = (tp[0], tp[1]);

        let (omega, rest) = dctp.split_at_mut(n);
        self.evaluator
            .omega_into(c, temperature, pressure, scratch, omega)?;
        let (_, dtdt) = self.energy_balance(c, temperature, omega);
        rest[0] = dtdt;
        rest[1] = 0.0;
        Ok(())
    }

    /// Evaluate `dctp` and `jac[(i, j)] = ∂dctp_i/∂ctp_j`.
    ///
    /// The pressure row and column are zero.
    pub fn jacobian(
        &self,
        t: f64,
        ctp: &[f64],
        scratch: &mut KineticsScratch,
        dctp: &mut [f64],
        jac: &mut DMatrix<f64>,
    ) -> KineticsResult<()> {
        self.derivatives(t, ctp, scratch, dctp)?;
        let n_eqns = self.n_eqns();
        if jac.nrows() != n_eqns || jac.ncols() != n_eqns {
            return Err(KineticsError::KernelMismatch {
                what: "Jacobian",
                expected: n_eqns,
                found: jac.nrows().max(jac.ncols()),
            });
        }
        jac.fill(0.0);

        let n = self.n_species();
        let species_floor =
            (SPECIES_FLOOR_FRACTION * ctp[..n].iter().map(|c| c.abs()).sum::<f64>())
                .max(SPECIES_FLOOR_MIN);
        let step = |j: usize, x: f64| {
            let floor = if j < n { species_floor } else { TEMPERATURE_FLOOR };
            perturbation(x, FD_EPSILON, floor)
        };

        match self.method {
            JacobianMethod::Analytic => {
                self.analytic_species_block(ctp, &dctp[..n], jac);
                finite_difference_columns(ctp, dctp, n..n + 1, step, jac, |xp, out| {
                    self.derivatives(t, xp, scratch, out)
                })?;
            }
            _ => {
                finite_difference_columns(ctp, dctp, 0..n + 1, step, jac, |xp, out| {
                    self.derivatives(t, xp, scratch, out)
                })?;
            }
        }
        Ok(())
    }

    /// Species columns from the reaction descriptors, with the temperature
    /// row by the chain rule.
    fn analytic_species_block(&self, ctp: &[f64], omega: &[f64], jac: &mut DMatrix<f64>) {
        let n = self.n_species();
        let c = &ctp[..n];
        let temperature = ctp[n];
        let model = self.evaluator.model();
        let species = model.species();

        let mut dnet = vec![0.0; n];
        for reaction in model.reactions() {
            dnet.fill(0.0);
            reaction_rate_derivative(reaction, species, c, temperature, &mut dnet);
            for sc in reaction.lhs() {
                for (j, d) in dnet.iter().enumerate() {
                    jac[(sc.index, j)] -= sc.stoich_coeff * d;
                }
            }
            for sc in reaction.rhs() {
                for (j, d) in dnet.iter().enumerate() {
                    jac[(sc.index, j)] += sc.stoich_coeff * d;
                }
            }
        }

        let (cp_sum, dtdt) = self.energy_balance(c, temperature, omega);
        if cp_sum <= VSMALL {
            return;
        }
        let h: Vec<f64> = species.iter().map(|sp| sp.thermo().h(temperature)).collect();
        for (j, sp) in species.iter().enumerate() {
            let dheat: f64 = (0..n).map(|i| h[i] * jac[(i, j)]).sum();
            jac[(n, j)] = (-dheat - dtdt * sp.thermo().cp(temperature)) / cp_sum;
        }
    }
}
