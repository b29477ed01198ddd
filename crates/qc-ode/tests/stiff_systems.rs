//! Integration tests for the adaptive stiff integrators.

use nalgebra::DMatrix;
use qc_core::Tolerances;
use qc_ode::{OdeError, OdeOptions, OdeResult, OdeSolver, OdeSolverKind, OdeSystem};

/// y' = -k y
struct Decay {
    k: f64,
}

impl OdeSystem for Decay {
    fn n_eqns(&self) -> usize {
        1
    }

    fn derivatives(&mut self, _x: f64, y: &[f64], dydx: &mut [f64]) -> OdeResult<()> {
        dydx[0] = -self.k * y[0];
        Ok(())
    }

    fn jacobian(
        &mut self,
        x: f64,
        y: &[f64],
        dydx: &mut [f64],
        jac: &mut DMatrix<f64>,
    ) -> OdeResult<()> {
        self.derivatives(x, y, dydx)?;
        jac[(0, 0)] = -self.k;
        Ok(())
    }
}

/// Robertson's stiff kinetics problem.
struct Robertson {
    abs_tol: f64,
}

impl OdeSystem for Robertson {
    fn n_eqns(&self) -> usize {
        3
    }

    fn derivatives(&mut self, _x: f64, y: &[f64], dydx: &mut [f64]) -> OdeResult<()> {
        let (k1, k2, k3) = (0.04, 3.0e7, 1.0e4);
        dydx[0] = -k1 * y[0] + k3 * y[1] * y[2];
        dydx[1] = k1 * y[0] - k3 * y[1] * y[2] - k2 * y[1] * y[1];
        dydx[2] = k2 * y[1] * y[1];
        Ok(())
    }

    fn jacobian(
        &mut self,
        x: f64,
        y: &[f64],
        dydx: &mut [f64],
        jac: &mut DMatrix<f64>,
    ) -> OdeResult<()> {
        self.derivatives(x, y, dydx)?;
        let (k1, k2, k3) = (0.04, 3.0e7, 1.0e4);
        jac[(0, 0)] = -k1;
        jac[(0, 1)] = k3 * y[2];
        jac[(0, 2)] = k3 * y[1];
        jac[(1, 0)] = k1;
        jac[(1, 1)] = -k3 * y[2] - 2.0 * k2 * y[1];
        jac[(1, 2)] = -k3 * y[1];
        jac[(2, 0)] = 0.0;
        jac[(2, 1)] = 2.0 * k2 * y[1];
        jac[(2, 2)] = 0.0;
        Ok(())
    }

    fn is_admissible(&self, y: &[f64]) -> bool {
        y.iter().all(|&yi| yi >= -self.abs_tol)
    }
}

/// A clock `y0' = 1` beside a stiff component relaxing onto `sin(w x)` and
/// a non-stiff one driven by `cos(w x)`.
struct ClockedRelaxation {
    k: f64,
    w: f64,
}

impl OdeSystem for ClockedRelaxation {
    fn n_eqns(&self) -> usize {
        3
    }

    fn derivatives(&mut self, x: f64, y: &[f64], dydx: &mut [f64]) -> OdeResult<()> {
        dydx[0] = 1.0;
        dydx[1] = -self.k * (y[1] - (self.w * x).sin());
        dydx[2] = (self.w * x).cos();
        Ok(())
    }

    fn jacobian(
        &mut self,
        x: f64,
        y: &[f64],
        dydx: &mut [f64],
        jac: &mut DMatrix<f64>,
    ) -> OdeResult<()> {
        self.derivatives(x, y, dydx)?;
        jac.fill(0.0);
        jac[(1, 1)] = -self.k;
        Ok(())
    }
}

/// A system whose every trial state is refused.
struct Refusing;

impl OdeSystem for Refusing {
    fn n_eqns(&self) -> usize {
        1
    }

    fn derivatives(&mut self, _x: f64, _y: &[f64], dydx: &mut [f64]) -> OdeResult<()> {
        dydx[0] = 0.0;
        Ok(())
    }

    fn jacobian(
        &mut self,
        _x: f64,
        _y: &[f64],
        dydx: &mut [f64],
        jac: &mut DMatrix<f64>,
    ) -> OdeResult<()> {
        dydx[0] = 0.0;
        jac[(0, 0)] = 0.0;
        Ok(())
    }

    fn is_admissible(&self, _y: &[f64]) -> bool {
        false
    }
}

fn opts(abs: f64, rel: f64) -> OdeOptions {
    OdeOptions {
        tolerances: Tolerances { abs, rel },
        ..OdeOptions::default()
    }
}

#[test]
fn linear_decay_matches_exponential() {
    for kind in OdeSolverKind::ALL {
        let (rel, allowed) = match kind {
            OdeSolverKind::EulerImplicit => (1e-7, 1e-3),
            _ => (1e-6, 1e-4),
        };
        let mut solver = OdeSolver::new(kind, 1);
        let mut y = [1.0];
        let mut dx = 1e-3;
        solver
            .solve(&mut Decay { k: 1.0 }, 0.0, 1.0, &mut y, &mut dx, &opts(1e-12, rel))
            .unwrap();
        let exact = (-1.0_f64).exp();
        assert!(
            ((y[0] - exact) / exact).abs() < allowed,
            "{kind}: y = {}, exact = {exact}",
            y[0]
        );
        assert!(dx > 0.0);
    }
}

#[test]
fn robertson_conserves_mass_and_stays_non_negative() {
    let abs = 1e-12;
    for kind in OdeSolverKind::ALL {
        let mut solver = OdeSolver::new(kind, 3);
        let mut y = [1.0, 0.0, 0.0];
        let mut dx = 1e-6;
        let mut x = 0.0;
        for x_end in [1e-3, 1e-1, 1.0, 10.0, 40.0] {
            solver
                .solve(
                    &mut Robertson { abs_tol: abs },
                    x,
                    x_end,
                    &mut y,
                    &mut dx,
                    &opts(abs, 1e-4),
                )
                .unwrap();
            x = x_end;
            let sum: f64 = y.iter().sum();
            assert!((sum - 1.0).abs() < 1e-10, "{kind}: sum = {sum}");
            assert!(y.iter().all(|&yi| yi >= -abs), "{kind}: y = {y:?}");
        }
    }
}

#[test]
fn robertson_reference_solution() {
    // Reference values at t = 40
    let reference = [0.715_827_068_7, 9.185_534_765e-6, 0.284_163_745_8];
    for kind in [OdeSolverKind::Seulex, OdeSolverKind::Rosenbrock12] {
        let mut solver = OdeSolver::new(kind, 3);
        let mut y = [1.0, 0.0, 0.0];
        let mut dx = 1e-6;
        solver
            .solve(
                &mut Robertson { abs_tol: 1e-12 },
                0.0,
                40.0,
                &mut y,
                &mut dx,
                &opts(1e-12, 1e-6),
            )
            .unwrap();
        for (got, want) in y.iter().zip(&reference) {
            assert!(
                ((got - want) / want).abs() < 5e-3,
                "{kind}: got {got}, want {want}"
            );
        }
    }
}

#[test]
fn integration_reaches_the_end_after_rejected_final_steps() {
    // An oversized first step is truncated to the interval and then rejected
    let opts = OdeOptions {
        max_steps: 100_000,
        ..opts(1e-8, 1e-4)
    };
    for kind in OdeSolverKind::ALL {
        for (x_end, dx0) in [(2.7, 10.0), (1.0, 0.9), (0.05, 1.0)] {
            let mut solver = OdeSolver::new(kind, 3);
            let mut y = [0.0, 0.0, 0.0];
            let mut dx = dx0;
            let stats = solver
                .solve(
                    &mut ClockedRelaxation { k: 1.0e3, w: 5.0 },
                    0.0,
                    x_end,
                    &mut y,
                    &mut dx,
                    &opts,
                )
                .unwrap();
            assert!(stats.rejected > 0, "{kind}: no rejected step");
            assert!(
                (y[0] - x_end).abs() <= 1e-9 * x_end,
                "{kind}: clock = {}, x_end = {x_end}",
                y[0]
            );
            assert!(dx > 0.0);
        }
    }
}

#[test]
fn tighter_tolerance_takes_more_steps() {
    let mut solver = OdeSolver::new(OdeSolverKind::Rosenbrock12, 1);
    let mut steps = Vec::new();
    for rel in [1e-3, 1e-5, 1e-7] {
        let mut y = [1.0];
        let mut dx = 1e-3;
        let stats = solver
            .solve(&mut Decay { k: 1.0 }, 0.0, 5.0, &mut y, &mut dx, &opts(1e-12, rel))
            .unwrap();
        steps.push(stats.steps);
    }
    assert!(steps[0] < steps[1] && steps[1] < steps[2], "{steps:?}");
}

#[test]
fn step_limit_is_convergence_failure() {
    let mut solver = OdeSolver::new(OdeSolverKind::Seulex, 1);
    let mut y = [1.0];
    let mut dx = 1e-3;
    let opts = OdeOptions {
        max_steps: 2,
        ..OdeOptions::default()
    };
    let err = solver
        .solve(&mut Decay { k: 1.0 }, 0.0, 100.0, &mut y, &mut dx, &opts)
        .unwrap_err();
    assert!(matches!(err, OdeError::ConvergenceFailed { .. }), "{err}");
}

#[test]
fn step_underflow_is_convergence_failure() {
    let mut solver = OdeSolver::new(OdeSolverKind::EulerImplicit, 1);
    let mut y = [1.0];
    let mut dx = 1.0;
    let opts = OdeOptions {
        min_step: 1e-6,
        ..OdeOptions::default()
    };
    let err = solver
        .solve(&mut Refusing, 0.0, 1.0, &mut y, &mut dx, &opts)
        .unwrap_err();
    match err {
        OdeError::ConvergenceFailed { what } => assert!(what.contains("underflow"), "{what}"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn unknown_solver_name_is_rejected() {
    let err = OdeSolver::from_name("rk45", 2).unwrap_err();
    assert_eq!(
        err,
        OdeError::UnknownSolver {
            name: "rk45".to_string()
        }
    );
    assert_eq!(
        OdeSolver::from_name("Rosenbrock12", 2).unwrap().kind(),
        OdeSolverKind::Rosenbrock12
    );
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn decay_stays_bounded(k in 0.1_f64..1.0e4, t_end in 1.0e-3_f64..1.0, idx in 0usize..3) {
            let kind = OdeSolverKind::ALL[idx];
            let mut solver = OdeSolver::new(kind, 1);
            let mut y = [1.0];
            let mut dx = 1e-4;
            solver
                .solve(&mut Decay { k }, 0.0, t_end, &mut y, &mut dx, &OdeOptions::default())
                .unwrap();
            prop_assert!(y[0] <= 1.0);
            prop_assert!(y[0] >= -1e-10, "{kind}: y = {}", y[0]);
            prop_assert!(dx > 0.0);
        }
    }
}
