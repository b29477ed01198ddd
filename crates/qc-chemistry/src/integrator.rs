//! Quasi-steady-state chemistry integrator.

use crate::cells::CellStates;
use crate::config::QssCoeffs;
use crate::diagnostics;
use crate::error::{ChemResult, ChemistryError};
use crate::state::ChemicalState;
use crate::system::CellSystem;
use crate::workspace::{Workspace, WorkspacePool};
use qc_core::timing::{Timer, chemistry_timing};
use qc_kinetics::{JacobianAssembler, RateProvider, ReactionRateEvaluator};
use qc_mechanism::ChemistryModel;
use std::sync::Arc;

/// Advances one cell's `[c, T, p]` over a time step with a stiff ODE solver.
///
/// The integrator itself is immutable and shareable across threads; every
/// solve borrows a [`Workspace`], either the caller's own or one checked out
/// of an internal pool for the duration of the call.
#[derive(Debug)]
pub struct QssIntegrator<M: ChemistryModel> {
    assembler: JacobianAssembler<M>,
    coeffs: QssCoeffs,
    pool: WorkspacePool,
}

fn invalid(what: String) -> ChemistryError {
    ChemistryError::InvalidArg { what }
}

impl<M: ChemistryModel> QssIntegrator<M> {
    /// Validate everything needed to solve: coefficients, mechanism and the
    /// provider's agreement with it.
    pub fn new(model: Arc<M>, provider: Box<dyn RateProvider>, coeffs: QssCoeffs) -> ChemResult<Self> {
        coeffs.validate()?;
        let evaluator = ReactionRateEvaluator::new(model, provider)?;
        Self::from_evaluator(evaluator, coeffs)
    }

    pub fn from_evaluator(evaluator: ReactionRateEvaluator<M>, coeffs: QssCoeffs) -> ChemResult<Self> {
        coeffs.validate()?;
        let assembler = JacobianAssembler::new(evaluator, coeffs.jacobian)?;
        tracing::debug!(
            solver = %coeffs.solver,
            jacobian = %assembler.method(),
            abs_tol = coeffs.tolerances.abs,
            rel_tol = coeffs.tolerances.rel,
            n_species = assembler.n_species(),
            "QSS integrator ready"
        );
        Ok(Self {
            assembler,
            coeffs,
            pool: WorkspacePool::default(),
        })
    }

    pub fn coeffs(&self) -> &QssCoeffs {
        &self.coeffs
    }

    pub fn assembler(&self) -> &JacobianAssembler<M> {
        &self.assembler
    }

    pub fn evaluator(&self) -> &ReactionRateEvaluator<M> {
        self.assembler.evaluator()
    }

    pub fn n_species(&self) -> usize {
        self.assembler.n_species()
    }

    /// A fresh workspace sized for this integrator.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.evaluator().scratch(), self.coeffs.solver)
    }

    fn check_workspace(&self, ws: &Workspace) -> ChemResult<()> {
        if ws.n_species() != self.n_species() || ws.solver() != self.coeffs.solver {
            return Err(invalid(format!(
                "workspace built for {} species with {}, integrator needs {} species with {}",
                ws.n_species(),
                ws.solver(),
                self.n_species(),
                self.coeffs.solver
            )));
        }
        Ok(())
    }

    fn check_inputs(&self, c: &[f64], t: f64, p: f64, delta_t: f64) -> ChemResult<()> {
        if c.len() != self.n_species() {
            return Err(ChemistryError::StateSize {
                expected: self.n_species(),
                found: c.len(),
            });
        }
        if !delta_t.is_finite() || delta_t < 0.0 {
            return Err(invalid(format!("deltaT must be finite and >= 0, got {delta_t}")));
        }
        if !t.is_finite() || t <= 0.0 {
            return Err(invalid(format!("temperature must be finite and > 0, got {t}")));
        }
        if !p.is_finite() || p <= 0.0 {
            return Err(invalid(format!("pressure must be finite and > 0, got {p}")));
        }
        if let Some(i) = c.iter().position(|v| !v.is_finite()) {
            return Err(invalid(format!("concentration {i} is not finite: {}", c[i])));
        }
        Ok(())
    }

    /// Advance `c`, `t` and `p` by `delta_t` using the pool's workspaces.
    ///
    /// See [`solve_with`](Self::solve_with).
    pub fn solve(
        &self,
        c: &mut [f64],
        t: &mut f64,
        p: &mut f64,
        delta_t: f64,
        sub_delta_t: &mut f64,
    ) -> ChemResult<()> {
        let mut ws = self.pool.checkout(|| self.workspace());
        self.solve_with(&mut ws, c, t, p, delta_t, sub_delta_t)
    }

    /// Advance `c`, `t` and `p` by `delta_t` using `ws` as scratch.
    ///
    /// `sub_delta_t` is the initial internal step on entry (ignored unless
    /// finite and positive) and the recommended next step on return, never
    /// larger than `delta_t`. A zero `delta_t` leaves the state alone and
    /// returns a zero sub-step. On error the state and `sub_delta_t` are
    /// left untouched.
    pub fn solve_with(
        &self,
        ws: &mut Workspace,
        c: &mut [f64],
        t: &mut f64,
        p: &mut f64,
        delta_t: f64,
        sub_delta_t: &mut f64,
    ) -> ChemResult<()> {
        self.check_workspace(ws)?;
        self.check_inputs(c, *t, *p, delta_t)?;
        if delta_t == 0.0 {
            *sub_delta_t = 0.0;
            return Ok(());
        }

        let n = self.n_species();
        let mut dt = if sub_delta_t.is_finite() && *sub_delta_t > 0.0 {
            sub_delta_t.min(delta_t)
        } else {
            delta_t
        };

        let Workspace { ctp, kinetics, ode } = ws;
        ctp[..n].copy_from_slice(c);
        ctp[n] = *t;
        ctp[n + 1] = *p;

        let timer = Timer::start();
        let mut system = CellSystem::new(&self.assembler, kinetics, self.coeffs.tolerances.abs);
        let result = ode.solve(
            &mut system,
            0.0,
            delta_t,
            ctp,
            &mut dt,
            &self.coeffs.ode_options(),
        );
        timer.stop_into(&chemistry_timing::CELL_SOLVES);

        let stats = match result {
            Ok(stats) => stats,
            Err(e) => {
                let err = match system.failure.take() {
                    Some(kinetics_err) => ChemistryError::from(kinetics_err),
                    None => ChemistryError::from(e),
                };
                tracing::warn!(
                    solver = %self.coeffs.solver,
                    delta_t,
                    temperature = *t,
                    error = %err,
                    "chemistry solve failed"
                );
                return Err(err);
            }
        };

        // Accepted states lie above -absTol; what remains below zero is roundoff.
        for (ci, &v) in c.iter_mut().zip(&ctp[..n]) {
            *ci = v.max(0.0);
        }
        *t = ctp[n];
        *p = ctp[n + 1];
        *sub_delta_t = dt.min(delta_t);

        tracing::trace!(
            steps = stats.steps,
            rejected = stats.rejected,
            sub_delta_t = *sub_delta_t,
            temperature = *t,
            "chemistry solve"
        );
        Ok(())
    }

    /// [`solve`](Self::solve) on a [`ChemicalState`].
    pub fn solve_state(
        &self,
        state: &mut ChemicalState,
        delta_t: f64,
        sub_delta_t: &mut f64,
    ) -> ChemResult<()> {
        let ChemicalState {
            c,
            temperature,
            pressure,
        } = state;
        self.solve(c, temperature, pressure, delta_t, sub_delta_t)
    }

    /// Mass production rate of `specie` by reaction `reaction` per cell.
    pub fn calculate_rr<C: CellStates + ?Sized>(
        &self,
        reaction: usize,
        specie: usize,
        cells: &C,
    ) -> ChemResult<Vec<f64>> {
        diagnostics::calculate_rr(self.evaluator(), reaction, specie, cells)
    }

    /// Chemical time scale per cell.
    pub fn tc<C: CellStates + ?Sized>(&self, cells: &C) -> ChemResult<Vec<f64>> {
        diagnostics::tc(self.evaluator(), cells)
    }
}

impl<M: ChemistryModel + 'static> QssIntegrator<M> {
    /// Integrator whose rates come from the model's own reactions.
    pub fn with_mechanism(model: Arc<M>, coeffs: QssCoeffs) -> ChemResult<Self> {
        coeffs.validate()?;
        let evaluator = ReactionRateEvaluator::with_mechanism_kernel(model)?;
        Self::from_evaluator(evaluator, coeffs)
    }
}
