//! OdeSystem trait for pluggable stiff systems.

use crate::error::OdeResult;
use nalgebra::DMatrix;

/// Right-hand side of an autonomous ODE system `dy/dx = f(y)`.
///
/// Methods take `&mut self` so systems can keep scratch buffers between
/// evaluations of the same integration.
pub trait OdeSystem {
    /// Number of equations.
    fn n_eqns(&self) -> usize;

    /// Evaluate `dydx = f(x, y)`.
    fn derivatives(&mut self, x: f64, y: &[f64], dydx: &mut [f64]) -> OdeResult<()>;

    /// Evaluate `dydx` and the Jacobian `jac[(i, j)] = ∂f_i/∂y_j`.
    fn jacobian(
        &mut self,
        x: f64,
        y: &[f64],
        dydx: &mut [f64],
        jac: &mut DMatrix<f64>,
    ) -> OdeResult<()>;

    /// Whether a trial state may be accepted.
    ///
    /// Returning `false` makes the driver reject the step and retry with a
    /// smaller one, exactly as for a step that failed error control.
    fn is_admissible(&self, _y: &[f64]) -> bool {
        true
    }
}
