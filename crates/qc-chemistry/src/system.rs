//! The `[c, T, p]` chemistry system seen by the ODE engine.

use nalgebra::DMatrix;
use qc_core::timing::{Timer, chemistry_timing};
use qc_kinetics::{JacobianAssembler, KineticsError, KineticsScratch};
use qc_mechanism::ChemistryModel;
use qc_ode::{OdeError, OdeResult, OdeSystem};

/// Whether the rates can be evaluated at all at `ctp`.
fn evaluable(ctp: &[f64], n: usize) -> bool {
    ctp.iter().all(|v| v.is_finite()) && ctp[n] > 0.0
}

/// Errors the engine should treat as a failed trial step rather than abort.
fn rejects_step(e: &KineticsError) -> bool {
    matches!(
        e,
        KineticsError::NonFinite { .. } | KineticsError::NonPhysical { .. }
    )
}

/// Binds the Jacobian assembler to one workspace's kernel buffers.
///
/// Trial states outside the physical domain evaluate to NaN so the engine
/// rejects the step and retries with a smaller one. Any other kinetics
/// failure is kept in `failure` for the caller to report.
pub(crate) struct CellSystem<'a, M: ChemistryModel> {
    assembler: &'a JacobianAssembler<M>,
    scratch: &'a mut KineticsScratch,
    abs_tol: f64,
    pub(crate) failure: Option<KineticsError>,
}

impl<'a, M: ChemistryModel> CellSystem<'a, M> {
    pub(crate) fn new(
        assembler: &'a JacobianAssembler<M>,
        scratch: &'a mut KineticsScratch,
        abs_tol: f64,
    ) -> Self {
        Self {
            assembler,
            scratch,
            abs_tol,
            failure: None,
        }
    }

    fn fail(&mut self, e: KineticsError) -> OdeError {
        let message = e.to_string();
        self.failure = Some(e);
        OdeError::System { message }
    }
}

impl<M: ChemistryModel> OdeSystem for CellSystem<'_, M> {
    fn n_eqns(&self) -> usize {
        self.assembler.n_eqns()
    }

    fn derivatives(&mut self, x: f64, y: &[f64], dydx: &mut [f64]) -> OdeResult<()> {
        let n = self.assembler.n_species();
        if y.len() == self.n_eqns() && !evaluable(y, n) {
            dydx.fill(f64::NAN);
            return Ok(());
        }
        match self.assembler.derivatives(x, y, self.scratch, dydx) {
            Ok(()) => Ok(()),
            Err(e) if rejects_step(&e) => {
                dydx.fill(f64::NAN);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn jacobian(
        &mut self,
        x: f64,
        y: &[f64],
        dydx: &mut [f64],
        jac: &mut DMatrix<f64>,
    ) -> OdeResult<()> {
        let timer = Timer::start();
        let result = self.assembler.jacobian(x, y, self.scratch, dydx, jac);
        timer.stop_into(&chemistry_timing::JACOBIANS);
        result.map_err(|e| self.fail(e))
    }

    fn is_admissible(&self, y: &[f64]) -> bool {
        let n = self.assembler.n_species();
        y.iter().all(|v| v.is_finite()) && y[..n].iter().all(|&c| c >= -self.abs_tol) && y[n] > 0.0
    }
}
