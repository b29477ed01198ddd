//! End-to-end behaviour of the QSS integrator on small mechanisms.

use qc_chemistry::{
    ChemicalState, ChemistryError, ChemistrySolver, QssCoeffs, QssIntegrator, solve_cells,
};
use qc_core::Tolerances;
use qc_mechanism::{Arrhenius, Mechanism, Reaction, Specie, Thermo};
use qc_ode::OdeSolverKind;
use std::sync::Arc;

const T0: f64 = 1000.0;
const P0: f64 = 101_325.0;

/// A => B at a constant rate `k` with thermally identical species.
fn a_to_b(k: f64) -> Arc<Mechanism> {
    let th = Thermo::constant_cp(30_000.0, 0.0);
    let species = vec![Specie::new("A", 28.0, th.clone()), Specie::new("B", 28.0, th)];
    let reaction = Reaction::irreversible("A=>B", Arrhenius::new(k, 0.0, 0.0))
        .reactant(0, 1.0)
        .product(1, 1.0);
    Arc::new(Mechanism::new(species, vec![reaction]).unwrap())
}

/// Fast exothermic A + B => C with slow C => A + B.
fn exothermic() -> Arc<Mechanism> {
    let species = vec![
        Specie::new("A", 2.0, Thermo::constant_cp(29_000.0, 0.0)),
        Specie::new("B", 32.0, Thermo::constant_cp(31_000.0, 0.0)),
        Specie::new("C", 34.0, Thermo::constant_cp(40_000.0, -5.0e7)),
    ];
    let reactions = vec![
        Reaction::irreversible("A+B=>C", Arrhenius::new(1.0e6, 0.0, 5_000.0))
            .reactant(0, 1.0)
            .reactant(1, 1.0)
            .product(2, 1.0),
        Reaction::irreversible("C=>A+B", Arrhenius::new(10.0, 0.0, 0.0))
            .reactant(2, 1.0)
            .product(0, 1.0)
            .product(1, 1.0),
    ];
    Arc::new(Mechanism::new(species, reactions).unwrap())
}

fn coeffs(solver: OdeSolverKind, rel: f64) -> QssCoeffs {
    QssCoeffs {
        solver,
        tolerances: Tolerances { abs: 1e-12, rel },
        ..QssCoeffs::default()
    }
}

#[test]
fn single_irreversible_reaction() {
    let k = 1.0e3;
    let chem = QssIntegrator::with_mechanism(a_to_b(k), QssCoeffs::default()).unwrap();
    let mut c = [1.0, 0.0];
    let (mut t, mut p) = (T0, P0);
    let mut sub = 0.0;

    let mut previous = c;
    for _ in 0..10 {
        chem.solve(&mut c, &mut t, &mut p, 1e-4, &mut sub).unwrap();
        assert!(c[0] < previous[0], "{c:?} after {previous:?}");
        assert!(c[1] > previous[1], "{c:?} after {previous:?}");
        assert!((c[0] + c[1] - 1.0).abs() < 1e-10);
        assert!(sub > 0.0 && sub <= 1e-4);
        previous = c;
    }

    let exact = (-k * 1e-3_f64).exp();
    assert!((c[0] - exact).abs() < 1e-3 * exact, "{} vs {exact}", c[0]);
    assert!((t - T0).abs() < 1e-9);
    assert_eq!(p, P0);
}

#[test]
fn every_engine_variant_integrates_the_scenario() {
    let k = 1.0e3;
    let exact = (-k * 1e-3_f64).exp();
    for solver in OdeSolverKind::ALL {
        let chem = QssIntegrator::with_mechanism(a_to_b(k), coeffs(solver, 1e-7)).unwrap();
        let mut state = ChemicalState::new(vec![1.0, 0.0], T0, P0);
        let mut sub = 0.0;
        chem.solve_state(&mut state, 1e-3, &mut sub).unwrap();
        assert!(
            (state.c[0] - exact).abs() < 1e-3 * exact,
            "{solver}: {} vs {exact}",
            state.c[0]
        );
    }
}

#[test]
fn exothermic_reaction_heats_the_cell() {
    let chem = QssIntegrator::with_mechanism(exothermic(), QssCoeffs::default()).unwrap();
    let mut state = ChemicalState::new(vec![0.02, 0.01, 0.0], T0, P0);
    let mut sub = 0.0;
    chem.solve_state(&mut state, 1e-3, &mut sub).unwrap();
    assert!(state.temperature > T0);
    assert!(state.c.iter().all(|&v| v >= 0.0));
    assert!(state.c[1] < 0.01 && state.c[2] > 0.0);
    assert_eq!(state.pressure, P0);
}

#[test]
fn tighter_tolerance_is_no_less_accurate() {
    let k = 5.0e3;
    let exact = (-k * 1e-3_f64).exp();
    let error = |rel: f64| {
        let chem = QssIntegrator::with_mechanism(a_to_b(k), coeffs(OdeSolverKind::Seulex, rel))
            .unwrap();
        let mut state = ChemicalState::new(vec![1.0, 0.0], T0, P0);
        let mut sub = 0.0;
        chem.solve_state(&mut state, 1e-3, &mut sub).unwrap();
        (state.c[0] - exact).abs()
    };
    let loose = error(1e-2);
    let tight = error(1e-7);
    assert!(tight <= loose + 1e-12, "tight {tight}, loose {loose}");
}

#[test]
fn step_limit_is_non_convergence_and_state_is_kept() {
    let chem = QssIntegrator::with_mechanism(
        a_to_b(1.0e3),
        QssCoeffs {
            max_steps: 2,
            ..QssCoeffs::default()
        },
    )
    .unwrap();
    let mut c = [1.0, 0.0];
    let (mut t, mut p) = (T0, P0);
    let mut sub = 1e-6;
    let err = chem
        .solve(&mut c, &mut t, &mut p, 1e-3, &mut sub)
        .unwrap_err();
    assert!(matches!(err, ChemistryError::NonConvergence { .. }), "{err}");
    assert_eq!(c, [1.0, 0.0]);
    assert_eq!((t, p), (T0, P0));
    assert_eq!(sub, 1e-6);
}

#[test]
fn parallel_cells_match_sequential_solves() {
    let chem = QssIntegrator::with_mechanism(exothermic(), QssCoeffs::default()).unwrap();
    let initial: Vec<ChemicalState> = (0..16)
        .map(|i| {
            let x = i as f64 / 16.0;
            let c = vec![0.02 * (1.0 - x), 0.01 + 0.01 * x, 0.001 * x];
            ChemicalState::new(c, 900.0 + 20.0 * i as f64, P0)
        })
        .collect();

    let mut sequential = initial.clone();
    let mut min_sub = f64::INFINITY;
    for state in &mut sequential {
        let mut sub = 1e-5;
        chem.solve_state(state, 1e-3, &mut sub).unwrap();
        min_sub = min_sub.min(sub);
    }

    let mut parallel = initial;
    let sub = solve_cells(&chem, &mut parallel, 1e-3, 1e-5).unwrap();

    assert!((sub - min_sub).abs() <= 1e-12 * min_sub);
    for (a, b) in parallel.iter().zip(&sequential) {
        assert!((a.temperature - b.temperature).abs() <= 1e-10 * b.temperature);
        for (x, y) in a.c.iter().zip(&b.c) {
            assert!((x - y).abs() <= 1e-10 * y.abs() + 1e-18);
        }
    }
}

#[test]
fn failing_cell_is_reported_by_index() {
    let chem = QssIntegrator::with_mechanism(a_to_b(1.0e3), QssCoeffs::default()).unwrap();
    let mut cells = vec![
        ChemicalState::new(vec![1.0, 0.0], T0, P0),
        ChemicalState::new(vec![1.0, 0.0], -1.0, P0),
    ];
    let err = solve_cells(&chem, &mut cells, 1e-3, 0.0).unwrap_err();
    match err {
        ChemistryError::Cell { cell, source } => {
            assert_eq!(cell, 1);
            assert!(matches!(*source, ChemistryError::InvalidArg { .. }));
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(cells[1].c, vec![1.0, 0.0]);
}

#[test]
fn zero_advance_over_cells() {
    let chem = QssIntegrator::with_mechanism(a_to_b(1.0e3), QssCoeffs::default()).unwrap();
    let mut cells = vec![ChemicalState::new(vec![0.5, 0.5], T0, P0); 4];
    let sub = solve_cells(&chem, &mut cells, 0.0, 1e-4).unwrap();
    assert_eq!(sub, 0.0);
    assert!(cells.iter().all(|s| s.c == [0.5, 0.5]));
    assert_eq!(ChemistrySolver::name(&chem), "QSS");
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn concentrations_stay_non_negative(
            c in prop::collection::vec(0.0_f64..0.05, 3),
            t in 800.0_f64..1500.0,
            dt in 1e-6_f64..1e-2,
        ) {
            let chem = QssIntegrator::with_mechanism(exothermic(), QssCoeffs::default()).unwrap();
            let mut state = ChemicalState::new(c, t, P0);
            let mut sub = 0.0;
            chem.solve_state(&mut state, dt, &mut sub).unwrap();
            prop_assert!(state.c.iter().all(|&v| v >= 0.0), "{:?}", state.c);
            prop_assert!(sub > 0.0 && sub <= dt);
        }
    }
}
