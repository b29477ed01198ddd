//! Extrapolated linearly implicit Euler.
//!
//! Runs the linearly implicit Euler scheme over the step with 2, 3, 4 and 6
//! substeps and combines the results by Aitken-Neville extrapolation. The
//! order is fixed; the error estimate is the difference between the two
//! highest-order entries of the tableau.

use crate::error::OdeResult;
use crate::stepper::{StepInput, Stepper, factor_implicit, reject};
use crate::system::OdeSystem;
use nalgebra::DVector;
use qc_core::Tolerances;

const SEQUENCE: [usize; 4] = [2, 3, 4, 6];

pub(crate) struct Seulex {
    /// Last computed entry of each tableau column
    table: Vec<DVector<f64>>,
    y_sub: DVector<f64>,
    rhs: DVector<f64>,
    dydx: Vec<f64>,
}

impl Seulex {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            table: vec![DVector::zeros(n); SEQUENCE.len()],
            y_sub: DVector::zeros(n),
            rhs: DVector::zeros(n),
            dydx: vec![0.0; n],
        }
    }

    /// `n_sub` linearly implicit Euler substeps over `input.dx` into `y_sub`.
    ///
    /// Returns `false` when the iteration matrix is singular.
    fn euler_sequence(
        &mut self,
        system: &mut dyn OdeSystem,
        input: &StepInput<'_>,
        n_sub: usize,
    ) -> OdeResult<bool> {
        let h = input.dx / n_sub as f64;
        let Some(lu) = factor_implicit(input.jac, h) else {
            return Ok(false);
        };

        for (r, f) in self.rhs.iter_mut().zip(input.dydx0) {
            *r = h * f;
        }
        if !lu.solve_mut(&mut self.rhs) {
            return Ok(false);
        }
        for ((ys, y0), d) in self.y_sub.iter_mut().zip(input.y0).zip(self.rhs.iter()) {
            *ys = y0 + d;
        }

        let mut x = input.x0 + h;
        for _ in 1..n_sub {
            system.derivatives(x, self.y_sub.as_slice(), &mut self.dydx)?;
            for (r, f) in self.rhs.iter_mut().zip(&self.dydx) {
                *r = h * f;
            }
            if !lu.solve_mut(&mut self.rhs) {
                return Ok(false);
            }
            self.y_sub += &self.rhs;
            x += h;
        }
        Ok(true)
    }
}

impl Stepper for Seulex {
    fn step(
        &mut self,
        system: &mut dyn OdeSystem,
        input: &StepInput<'_>,
        _tolerances: Tolerances,
        y: &mut [f64],
        err: &mut [f64],
    ) -> OdeResult<()> {
        for (k, &n_k) in SEQUENCE.iter().enumerate() {
            if !self.euler_sequence(system, input, n_k)? {
                reject(input.y0, y, err);
                return Ok(());
            }
            let mut current = self.y_sub.clone();
            for l in 1..=k {
                let ratio = n_k as f64 / SEQUENCE[k - l] as f64;
                let next = &current + (&current - &self.table[l - 1]) / (ratio - 1.0);
                self.table[l - 1] = current;
                current = next;
            }
            self.table[k] = current;
        }

        let last = SEQUENCE.len() - 1;
        let best = &self.table[last];
        let lower = &self.table[last - 1];
        for i in 0..y.len() {
            y[i] = best[i];
            err[i] = best[i] - lower[i];
        }
        Ok(())
    }
}
