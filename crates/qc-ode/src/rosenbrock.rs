//! Two-stage L-stable Rosenbrock scheme (ROS2) with embedded first-order error.

use crate::error::OdeResult;
use crate::stepper::{StepInput, Stepper, factor_implicit, reject};
use crate::system::OdeSystem;
use nalgebra::DVector;
use qc_core::Tolerances;
use std::f64::consts::FRAC_1_SQRT_2;

const GAMMA: f64 = 1.0 + FRAC_1_SQRT_2;

pub(crate) struct Rosenbrock12 {
    k1: DVector<f64>,
    k2: DVector<f64>,
    y_mid: Vec<f64>,
    f_mid: Vec<f64>,
}

impl Rosenbrock12 {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            k1: DVector::zeros(n),
            k2: DVector::zeros(n),
            y_mid: vec![0.0; n],
            f_mid: vec![0.0; n],
        }
    }
}

impl Stepper for Rosenbrock12 {
    fn step(
        &mut self,
        system: &mut dyn OdeSystem,
        input: &StepInput<'_>,
        _tolerances: Tolerances,
        y: &mut [f64],
        err: &mut [f64],
    ) -> OdeResult<()> {
        let dx = input.dx;
        let Some(lu) = factor_implicit(input.jac, GAMMA * dx) else {
            reject(input.y0, y, err);
            return Ok(());
        };

        self.k1.copy_from_slice(input.dydx0);
        if !lu.solve_mut(&mut self.k1) {
            reject(input.y0, y, err);
            return Ok(());
        }

        for ((ym, y0), k1) in self.y_mid.iter_mut().zip(input.y0).zip(self.k1.iter()) {
            *ym = y0 + dx * k1;
        }
        system.derivatives(input.x0 + dx, &self.y_mid, &mut self.f_mid)?;

        for ((k2, f), k1) in self.k2.iter_mut().zip(&self.f_mid).zip(self.k1.iter()) {
            *k2 = f - 2.0 * k1;
        }
        if !lu.solve_mut(&mut self.k2) {
            reject(input.y0, y, err);
            return Ok(());
        }

        for i in 0..y.len() {
            y[i] = input.y0[i] + dx * (1.5 * self.k1[i] + 0.5 * self.k2[i]);
            err[i] = 0.5 * dx * (self.k1[i] + self.k2[i]);
        }
        Ok(())
    }
}
