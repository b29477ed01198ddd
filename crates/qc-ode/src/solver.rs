//! Adaptive step-size driver.

use crate::error::{OdeError, OdeResult};
use crate::euler_implicit::EulerImplicit;
use crate::options::OdeOptions;
use crate::rosenbrock::Rosenbrock12;
use crate::seulex::Seulex;
use crate::stepper::{StepInput, Stepper};
use crate::system::OdeSystem;
use nalgebra::DMatrix;
use qc_core::scaled_error_norm;
use std::fmt;
use std::str::FromStr;

const SAFE_SCALE: f64 = 0.9;
const ALPHA_INC: f64 = 0.2;
const ALPHA_DEC: f64 = 0.25;
const MIN_SCALE: f64 = 0.2;
const MAX_SCALE: f64 = 10.0;

/// Available integration schemes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OdeSolverKind {
    #[default]
    Seulex,
    Rosenbrock12,
    EulerImplicit,
}

impl OdeSolverKind {
    pub const ALL: [OdeSolverKind; 3] = [
        OdeSolverKind::Seulex,
        OdeSolverKind::Rosenbrock12,
        OdeSolverKind::EulerImplicit,
    ];

    /// Configuration name (case-sensitive).
    pub fn name(self) -> &'static str {
        match self {
            OdeSolverKind::Seulex => "seulex",
            OdeSolverKind::Rosenbrock12 => "Rosenbrock12",
            OdeSolverKind::EulerImplicit => "EulerImplicit",
        }
    }
}

impl fmt::Display for OdeSolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OdeSolverKind {
    type Err = OdeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| OdeError::UnknownSolver {
                name: s.to_string(),
            })
    }
}

/// Step bookkeeping for one call to [`OdeSolver::solve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepState {
    /// Step to attempt next
    pub dx_try: f64,
    /// Step actually taken by the last accepted step
    pub dx_did: f64,
    pub first: bool,
    /// Current step was truncated to land on the end point
    pub last: bool,
    /// Current step needed at least one retry
    pub reject: bool,
    pub prev_reject: bool,
}

impl StepState {
    pub fn new(dx_try: f64) -> Self {
        Self {
            dx_try,
            dx_did: 0.0,
            first: true,
            last: false,
            reject: false,
            prev_reject: false,
        }
    }
}

/// Counters for one call to [`OdeSolver::solve`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OdeStats {
    /// Accepted steps
    pub steps: usize,
    /// Rejected trial steps
    pub rejected: usize,
}

/// Adaptive integrator for one system size, owning all of its scratch.
pub struct OdeSolver {
    kind: OdeSolverKind,
    n: usize,
    stepper: Box<dyn Stepper>,
    dydx0: Vec<f64>,
    jac: DMatrix<f64>,
    y_trial: Vec<f64>,
    err: Vec<f64>,
}

impl fmt::Debug for OdeSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdeSolver")
            .field("kind", &self.kind)
            .field("n", &self.n)
            .finish()
    }
}

impl OdeSolver {
    pub fn new(kind: OdeSolverKind, n: usize) -> Self {
        let stepper: Box<dyn Stepper> = match kind {
            OdeSolverKind::Seulex => Box::new(Seulex::new(n)),
            OdeSolverKind::Rosenbrock12 => Box::new(Rosenbrock12::new(n)),
            OdeSolverKind::EulerImplicit => Box::new(EulerImplicit::new(n)),
        };
        Self {
            kind,
            n,
            stepper,
            dydx0: vec![0.0; n],
            jac: DMatrix::zeros(n, n),
            y_trial: vec![0.0; n],
            err: vec![0.0; n],
        }
    }

    /// Build from a configuration name such as `"seulex"`.
    pub fn from_name(name: &str, n: usize) -> OdeResult<Self> {
        Ok(Self::new(name.parse()?, n))
    }

    pub fn kind(&self) -> OdeSolverKind {
        self.kind
    }

    pub fn n_eqns(&self) -> usize {
        self.n
    }

    /// Integrate `y` from `x_start` to `x_end`.
    ///
    /// `dx_try` is the initial step on entry and the recommended next step on
    /// return. `y` is only meaningful on success; callers that must keep
    /// their state on failure integrate a copy.
    pub fn solve(
        &mut self,
        system: &mut dyn OdeSystem,
        x_start: f64,
        x_end: f64,
        y: &mut [f64],
        dx_try: &mut f64,
        opts: &OdeOptions,
    ) -> OdeResult<OdeStats> {
        opts.validate()?;
        if system.n_eqns() != self.n || y.len() != self.n {
            return Err(OdeError::InvalidArg {
                what: format!(
                    "solver sized for {} equations, system has {} and state has {}",
                    self.n,
                    system.n_eqns(),
                    y.len()
                ),
            });
        }
        if !(x_start.is_finite() && x_end.is_finite()) || x_end < x_start {
            return Err(OdeError::InvalidArg {
                what: format!("invalid interval [{x_start}, {x_end}]"),
            });
        }
        if !dx_try.is_finite() || *dx_try <= 0.0 {
            return Err(OdeError::InvalidArg {
                what: format!("initial step must be positive, got {dx_try}"),
            });
        }

        let mut stats = OdeStats::default();
        if x_end == x_start {
            return Ok(stats);
        }

        let mut step = StepState::new(*dx_try);
        let mut x = x_start;

        for n_step in 0..opts.max_steps {
            let dx_try0 = step.dx_try;
            step.reject = false;
            step.last = false;

            if (x + step.dx_try - x_end) * (x + step.dx_try - x_start) > 0.0 {
                step.last = true;
                step.dx_try = x_end - x;
            }

            self.adaptive_step(system, &mut x, y, &mut step, opts, &mut stats)?;
            stats.steps += 1;

            // Only an accepted step of exactly the truncated size lands on the end
            if step.last && !step.reject {
                x = x_end;
            }

            if (x - x_end) * (x_end - x_start) >= 0.0 {
                if n_step > 0 && step.last {
                    step.dx_try = dx_try0;
                }
                *dx_try = step.dx_try;
                return Ok(stats);
            }

            step.first = false;
            if step.reject {
                step.prev_reject = true;
            }
        }

        tracing::debug!(
            solver = %self.kind,
            max_steps = opts.max_steps,
            x,
            x_end,
            "ODE integration exceeded step limit"
        );
        Err(OdeError::ConvergenceFailed {
            what: format!(
                "maximum number of steps {} exceeded at x = {x} (x_end = {x_end})",
                opts.max_steps
            ),
        })
    }

    /// Take one accepted step from `x`, shrinking it until the error is within tolerance.
    fn adaptive_step(
        &mut self,
        system: &mut dyn OdeSystem,
        x: &mut f64,
        y: &mut [f64],
        step: &mut StepState,
        opts: &OdeOptions,
        stats: &mut OdeStats,
    ) -> OdeResult<()> {
        let mut dx = step.dx_try;
        system.jacobian(*x, y, &mut self.dydx0, &mut self.jac)?;

        let err = loop {
            let input = StepInput {
                x0: *x,
                y0: y,
                dydx0: &self.dydx0,
                jac: &self.jac,
                dx,
            };
            self.stepper.step(
                system,
                &input,
                opts.tolerances,
                &mut self.y_trial,
                &mut self.err,
            )?;

            let err = if system.is_admissible(&self.y_trial) {
                scaled_error_norm(y, &self.y_trial, &self.err, opts.tolerances)
            } else {
                f64::INFINITY
            };
            if err <= 1.0 {
                break err;
            }

            stats.rejected += 1;
            step.reject = true;
            let scale = (SAFE_SCALE * err.powf(-ALPHA_DEC)).max(MIN_SCALE);
            dx *= scale;
            if dx < opts.min_step {
                tracing::debug!(solver = %self.kind, x = *x, dx, "step size underflow");
                return Err(OdeError::ConvergenceFailed {
                    what: format!("step size underflow: dx = {dx:e} at x = {}", *x),
                });
            }
        };

        *x += dx;
        y.copy_from_slice(&self.y_trial);
        step.dx_did = dx;

        if err > (MAX_SCALE / SAFE_SCALE).powf(-1.0 / ALPHA_INC) {
            let scale = (SAFE_SCALE * err.powf(-ALPHA_INC)).clamp(MIN_SCALE, MAX_SCALE);
            step.dx_try = scale * dx;
        } else {
            step.dx_try = SAFE_SCALE * MAX_SCALE * dx;
        }
        Ok(())
    }
}
