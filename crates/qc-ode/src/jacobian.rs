//! Finite difference Jacobian computation.

use crate::error::OdeResult;
use nalgebra::{DMatrix, DVector};
use std::ops::Range;

/// Relative perturbation for forward differences, `sqrt(machine epsilon)`.
pub const FD_EPSILON: f64 = 1.490_116_119_384_765_6e-8;

/// Perturbation `epsilon * max(|x|, floor)`.
#[inline]
pub fn perturbation(x: f64, epsilon: f64, floor: f64) -> f64 {
    epsilon * x.abs().max(floor)
}

/// Fill the given columns of `jac` with forward differences.
///
/// For each column j, perturbs x[j] by `step(j, x[j])` and stores
/// (f(x+e) - f(x))/dx. `f_x` must hold f(x). Columns outside the range are
/// left untouched. Deterministic for a given `x`.
pub fn finite_difference_columns<F, S, E>(
    x: &[f64],
    f_x: &[f64],
    columns: Range<usize>,
    step: S,
    jac: &mut DMatrix<f64>,
    mut f: F,
) -> Result<(), E>
where
    F: FnMut(&[f64], &mut [f64]) -> Result<(), E>,
    S: Fn(usize, f64) -> f64,
{
    let m = f_x.len();
    let mut x_perturbed = x.to_vec();
    let mut f_perturbed = vec![0.0; m];

    for j in columns {
        let dx = step(j, x[j]);
        x_perturbed[j] = x[j] + dx;
        // Use the representable step actually taken.
        let dx = x_perturbed[j] - x[j];

        f(&x_perturbed, &mut f_perturbed)?;
        for i in 0..m {
            jac[(i, j)] = (f_perturbed[i] - f_x[i]) / dx;
        }
        x_perturbed[j] = x[j];
    }

    Ok(())
}

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by epsilon * max(|x[j]|, 1) and computes
/// (f(x+e) - f(x))/dx.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> OdeResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> OdeResult<DVector<f64>>,
{
    let f_x = f(x)?;
    let mut jac = DMatrix::zeros(f_x.len(), x.len());
    finite_difference_columns(
        x.as_slice(),
        f_x.as_slice(),
        0..x.len(),
        |_, xj| perturbation(xj, epsilon, 1.0),
        &mut jac,
        |xp: &[f64], out: &mut [f64]| -> OdeResult<()> {
            let fp = f(&DVector::from_column_slice(xp))?;
            out.copy_from_slice(fp.as_slice());
            Ok(())
        },
    )?;
    Ok(jac)
}

/// Compute Jacobian using central finite differences (more accurate but 2x cost).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> OdeResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> OdeResult<DVector<f64>>,
{
    let n = x.len();
    let f_x = f(x)?;
    let m = f_x.len();

    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let dx = perturbation(x[j], epsilon, 1.0);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        let df = (f_plus - f_minus) / (2.0 * dx);

        for i in 0..m {
            jac[(i, j)] = df[i];
        }
    }

    Ok(jac)
}
