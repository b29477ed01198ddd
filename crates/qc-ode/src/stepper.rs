//! Single-step schemes driven by the adaptive controller.

use crate::error::OdeResult;
use crate::system::OdeSystem;
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, Dyn};
use qc_core::Tolerances;

/// State at the start of a trial step, shared by every retry of that step.
pub(crate) struct StepInput<'a> {
    pub x0: f64,
    pub y0: &'a [f64],
    pub dydx0: &'a [f64],
    pub jac: &'a DMatrix<f64>,
    pub dx: f64,
}

pub(crate) trait Stepper: Send {
    /// Advance `input.y0` by `input.dx` into `y`, writing a local error
    /// estimate into `err`.
    ///
    /// A failed linear or Newton solve fills `err` with infinity instead of
    /// returning an error, so the controller retries with a smaller step.
    fn step(
        &mut self,
        system: &mut dyn OdeSystem,
        input: &StepInput<'_>,
        tolerances: Tolerances,
        y: &mut [f64],
        err: &mut [f64],
    ) -> OdeResult<()>;
}

/// LU factors of `I - scale * jac`, or `None` when singular.
pub(crate) fn factor_implicit(jac: &DMatrix<f64>, scale: f64) -> Option<LU<f64, Dyn, Dyn>> {
    let n = jac.nrows();
    let a = DMatrix::<f64>::identity(n, n) - jac * scale;
    let lu = a.lu();
    lu.is_invertible().then_some(lu)
}

/// Mark a trial step as failed.
pub(crate) fn reject(y0: &[f64], y: &mut [f64], err: &mut [f64]) {
    y.copy_from_slice(y0);
    err.fill(f64::INFINITY);
}
