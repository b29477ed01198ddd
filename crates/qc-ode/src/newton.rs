//! Newton solver with backtracking line search.

use crate::error::{OdeError, OdeResult};
use nalgebra::{DMatrix, DVector};
use qc_core::Tolerances;

/// Nonlinear system `r(x) = 0` with its Jacobian.
pub trait NonlinearProblem {
    fn residual(&mut self, x: &DVector<f64>) -> OdeResult<DVector<f64>>;

    /// `∂r/∂x` at `x`. A simplified Newton iteration may return a frozen matrix.
    fn jacobian(&mut self, x: &DVector<f64>) -> OdeResult<DMatrix<f64>>;
}

/// Newton solver configuration.
#[derive(Clone, Debug)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Residual tolerance (abs) and component-wise step tolerance (abs + rel |x|)
    pub tolerances: Tolerances,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations, 0 for full steps
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerances: Tolerances {
                abs: 1e-10,
                rel: 1e-8,
            },
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

/// Newton iteration result.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
}

fn max_norm(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, vi| m.max(vi.abs()))
}

/// Weighted max-norm of a Newton update, `<= 1` once the update is within tolerance.
fn step_norm(dx: &DVector<f64>, x: &DVector<f64>, tol: Tolerances) -> f64 {
    dx.iter()
        .zip(x.iter())
        .fold(0.0_f64, |m, (d, xi)| m.max(d.abs() / (tol.abs + tol.rel * xi.abs())))
}

fn check_residual(r: &DVector<f64>) -> OdeResult<f64> {
    let norm = max_norm(r);
    if norm.is_finite() {
        Ok(norm)
    } else {
        Err(OdeError::Numeric {
            what: "non-finite Newton residual".to_string(),
        })
    }
}

/// Solve `r(x) = 0` from `x0`.
///
/// Converges when the residual max-norm drops below `tolerances.abs` or the
/// accepted update is within the weighted step tolerance.
pub fn newton_solve<P>(
    problem: &mut P,
    x0: DVector<f64>,
    config: &NewtonConfig,
) -> OdeResult<NewtonResult>
where
    P: NonlinearProblem + ?Sized,
{
    let mut x = x0;
    let mut r = problem.residual(&x)?;
    let mut r_norm = check_residual(&r)?;

    for iter in 0..config.max_iterations {
        if r_norm < config.tolerances.abs {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
            });
        }

        let jac = problem.jacobian(&x)?;

        // Solve J * dx = -r
        let dx = jac.lu().solve(&(-&r)).ok_or_else(|| OdeError::Numeric {
            what: "Newton matrix is singular".to_string(),
        })?;

        let mut alpha = 1.0;
        let mut x_new = &x + &dx;
        let mut r_new = problem.residual(&x_new)?;
        let mut r_new_norm = max_norm(&r_new);

        for _ in 0..config.max_line_search_iters {
            if r_new_norm.is_finite() && r_new_norm < r_norm {
                break;
            }
            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
            r_new = problem.residual(&x_new)?;
            r_new_norm = max_norm(&r_new);
        }
        check_residual(&r_new)?;

        let converged = step_norm(&(alpha * &dx), &x_new, config.tolerances) <= 1.0;

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;

        if converged {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter + 1,
            });
        }

        if alpha < 1e-10 {
            return Err(OdeError::ConvergenceFailed {
                what: format!("Line search stagnated at iteration {}", iter),
            });
        }
    }

    Err(OdeError::ConvergenceFailed {
        what: format!(
            "Maximum iterations {} reached, residual = {}",
            config.max_iterations, r_norm
        ),
    })
}
