//! Implicit Euler with step doubling.
//!
//! Each stage solves `y - y_start - h f(y) = 0` by simplified Newton with the
//! iteration matrix `I - h J` frozen at the start of the step. The step is
//! taken once with `h` and once as two halves; the halves give the result
//! and their difference from the full step gives the error estimate.

use crate::error::{OdeError, OdeResult};
use crate::newton::{NewtonConfig, NonlinearProblem, newton_solve};
use crate::stepper::{StepInput, Stepper, reject};
use crate::system::OdeSystem;
use nalgebra::{DMatrix, DVector};
use qc_core::Tolerances;

const MAX_NEWTON_ITERATIONS: usize = 20;
/// Newton tolerance relative to the integration tolerance.
const NEWTON_TOLERANCE_FACTOR: f64 = 0.01;

struct ImplicitStage<'a> {
    system: &'a mut dyn OdeSystem,
    x: f64,
    y_start: &'a [f64],
    h: f64,
    matrix: DMatrix<f64>,
    f: Vec<f64>,
}

impl NonlinearProblem for ImplicitStage<'_> {
    fn residual(&mut self, y: &DVector<f64>) -> OdeResult<DVector<f64>> {
        self.system.derivatives(self.x, y.as_slice(), &mut self.f)?;
        Ok(DVector::from_iterator(
            y.len(),
            y.iter()
                .zip(self.y_start)
                .zip(&self.f)
                .map(|((yi, y0), fi)| yi - y0 - self.h * fi),
        ))
    }

    fn jacobian(&mut self, _y: &DVector<f64>) -> OdeResult<DMatrix<f64>> {
        Ok(self.matrix.clone())
    }
}

pub(crate) struct EulerImplicit {
    y_full: Vec<f64>,
    y_half: Vec<f64>,
}

impl EulerImplicit {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            y_full: vec![0.0; n],
            y_half: vec![0.0; n],
        }
    }
}

/// One implicit Euler stage from `y_start` over `h`, or `None` when Newton fails.
fn implicit_stage(
    system: &mut dyn OdeSystem,
    jac: &DMatrix<f64>,
    x: f64,
    y_start: &[f64],
    h: f64,
    config: &NewtonConfig,
    out: &mut [f64],
) -> OdeResult<bool> {
    let n = y_start.len();
    let mut stage = ImplicitStage {
        system,
        x: x + h,
        y_start,
        h,
        matrix: DMatrix::<f64>::identity(n, n) - jac * h,
        f: vec![0.0; n],
    };
    match newton_solve(&mut stage, DVector::from_column_slice(y_start), config) {
        Ok(result) => {
            out.copy_from_slice(result.x.as_slice());
            Ok(true)
        }
        Err(OdeError::ConvergenceFailed { .. } | OdeError::Numeric { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

impl Stepper for EulerImplicit {
    fn step(
        &mut self,
        system: &mut dyn OdeSystem,
        input: &StepInput<'_>,
        tolerances: Tolerances,
        y: &mut [f64],
        err: &mut [f64],
    ) -> OdeResult<()> {
        let config = NewtonConfig {
            max_iterations: MAX_NEWTON_ITERATIONS,
            tolerances: Tolerances {
                abs: tolerances.abs * NEWTON_TOLERANCE_FACTOR,
                rel: tolerances.rel * NEWTON_TOLERANCE_FACTOR,
            },
            max_line_search_iters: 0,
            ..NewtonConfig::default()
        };
        let (x0, dx, jac) = (input.x0, input.dx, input.jac);
        let half = 0.5 * dx;

        let ok = implicit_stage(system, jac, x0, input.y0, dx, &config, &mut self.y_full)?
            && implicit_stage(system, jac, x0, input.y0, half, &config, &mut self.y_half)?
            && implicit_stage(system, jac, x0 + half, &self.y_half, half, &config, y)?;
        if !ok {
            reject(input.y0, y, err);
            return Ok(());
        }

        for ((e, yi), yf) in err.iter_mut().zip(y.iter()).zip(&self.y_full) {
            *e = yi - yf;
        }
        Ok(())
    }
}
