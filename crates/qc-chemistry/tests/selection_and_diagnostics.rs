//! Solver selection from configuration and the diagnostic fields.

use qc_chemistry::{
    ChemicalState, ChemistryError, ChemistryProperties, QssCoeffs, QssIntegrator,
    new_chemistry_solver,
};
use qc_core::VGREAT;
use qc_kinetics::{KernelBasis, KernelWork, KineticsResult, MechanismKernel, RateProvider};
use qc_mechanism::{Arrhenius, ChemistryModel, Mechanism, Reaction, Specie, Thermo};
use std::sync::Arc;

fn a_to_b(k: f64) -> Arc<Mechanism> {
    let th = Thermo::constant_cp(30_000.0, 0.0);
    let species = vec![Specie::new("A", 28.0, th.clone()), Specie::new("B", 32.0, th)];
    let reaction = Reaction::irreversible("A=>B", Arrhenius::new(k, 0.0, 0.0))
        .reactant(0, 1.0)
        .product(1, 1.0);
    Arc::new(Mechanism::new(species, vec![reaction]).unwrap())
}

/// Every species decays at rate `k`, without exposing any reactions.
struct OpaqueDecay {
    k: f64,
}

impl RateProvider for OpaqueDecay {
    fn n_species(&self) -> usize {
        2
    }

    fn basis(&self) -> KernelBasis {
        KernelBasis::Concentration
    }

    fn evaluate(
        &self,
        _p: f64,
        _t: f64,
        fractions: &mut [f64],
        _work: &mut KernelWork,
        rates: &mut [f64],
    ) -> KineticsResult<()> {
        for (r, c) in rates.iter_mut().zip(fractions.iter()) {
            *r = -self.k * c;
        }
        Ok(())
    }
}

const QSS_YAML: &str = "
chemistryType:
  chemistrySolver: QSS
  chemistryThermo: psi
QSSCoeffs:
  solver: Rosenbrock12
  absTol: 1e-12
  relTol: 1e-5
  jacobian: finiteDifference
";

#[test]
fn qss_is_selected_from_yaml() {
    let props = ChemistryProperties::from_yaml_str(QSS_YAML).unwrap();
    let mech = a_to_b(100.0);
    let kernel = MechanismKernel::new(Arc::clone(&mech));
    let solver = new_chemistry_solver(&props, mech, Box::new(kernel)).unwrap();
    assert_eq!(solver.name(), "QSS");
    assert_eq!(solver.n_species(), 2);

    let mut state = ChemicalState::new(vec![1.0, 0.0], 1000.0, 101_325.0);
    let mut sub = 0.0;
    solver.solve_state(&mut state, 1e-3, &mut sub).unwrap();
    let exact = (-0.1_f64).exp();
    assert!((state.c[0] - exact).abs() < 1e-4);
}

#[test]
fn none_leaves_state_unchanged() {
    let props =
        ChemistryProperties::from_yaml_str("chemistryType:\n  chemistrySolver: none\n").unwrap();
    let mech = a_to_b(100.0);
    let kernel = MechanismKernel::new(Arc::clone(&mech));
    let solver = new_chemistry_solver(&props, mech, Box::new(kernel)).unwrap();
    assert_eq!(solver.name(), "none");

    let initial = ChemicalState::new(vec![1.0, 0.0], 1000.0, 101_325.0);
    let mut state = initial.clone();
    let mut sub = 0.0;
    solver.solve_state(&mut state, 1e-3, &mut sub).unwrap();
    assert_eq!(state, initial);
    assert_eq!(sub, 1e-3);
}

#[test]
fn unsupported_variant_fails_construction() {
    let yaml = QSS_YAML.replace("Rosenbrock12", "rk45");
    let props = ChemistryProperties::from_yaml_str(&yaml).unwrap();
    let mech = a_to_b(100.0);
    let kernel = MechanismKernel::new(Arc::clone(&mech));
    let err = new_chemistry_solver(&props, mech, Box::new(kernel))
        .err()
        .unwrap();
    assert!(matches!(err, ChemistryError::Configuration { .. }), "{err}");
}

#[test]
fn analytic_jacobian_needs_reactions() {
    let yaml = QSS_YAML.replace("finiteDifference", "analytic");
    let props = ChemistryProperties::from_yaml_str(&yaml).unwrap();
    let mech = a_to_b(100.0);
    let species_only = Arc::new(Mechanism::species_only(mech.species().to_vec()).unwrap());
    let err = new_chemistry_solver(&props, species_only, Box::new(OpaqueDecay { k: 1.0 }))
        .err()
        .unwrap();
    assert!(matches!(err, ChemistryError::Configuration { .. }), "{err}");
}

#[test]
fn load_reads_yaml_and_json_files() {
    let dir = std::env::temp_dir().join(format!("qc-chemistry-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let yaml_path = dir.join("chemistryProperties.yaml");
    std::fs::write(&yaml_path, QSS_YAML).unwrap();
    let from_yaml = qc_chemistry::config::load(&yaml_path).unwrap();

    let json_path = dir.join("chemistryProperties.json");
    std::fs::write(&json_path, serde_json::to_string(&from_yaml).unwrap()).unwrap();
    let from_json = qc_chemistry::config::load(&json_path).unwrap();
    assert_eq!(from_yaml, from_json);

    let missing = qc_chemistry::config::load(&dir.join("missing.yaml")).unwrap_err();
    assert!(matches!(missing, ChemistryError::Io(_)));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn reaction_rate_field_closed_form() {
    let k = 100.0;
    let chem = QssIntegrator::with_mechanism(a_to_b(k), QssCoeffs::default()).unwrap();
    let cells = vec![
        ChemicalState::new(vec![2.0, 0.0], 1000.0, 101_325.0),
        ChemicalState::new(vec![0.0, 1.0], 1000.0, 101_325.0),
    ];
    // net = k c_A; A is consumed and B produced, scaled by molar mass
    let rr_a = chem.calculate_rr(0, 0, cells.as_slice()).unwrap();
    let rr_b = chem.calculate_rr(0, 1, cells.as_slice()).unwrap();
    assert_eq!(rr_a, vec![-k * 2.0 * 28.0, 0.0]);
    assert_eq!(rr_b, vec![k * 2.0 * 32.0, 0.0]);

    assert!(matches!(
        chem.calculate_rr(1, 0, cells.as_slice()),
        Err(ChemistryError::Mechanism(_))
    ));
    assert!(matches!(
        chem.calculate_rr(0, 2, cells.as_slice()),
        Err(ChemistryError::Mechanism(_))
    ));
}

#[test]
fn time_scale_closed_form() {
    let k = 100.0;
    let chem = QssIntegrator::with_mechanism(a_to_b(k), QssCoeffs::default()).unwrap();
    let cells = vec![
        ChemicalState::new(vec![2.0, 0.0], 1000.0, 101_325.0),
        ChemicalState::new(vec![0.0, 1.0], 1000.0, 101_325.0),
    ];
    // Σc Σw / Σw² with a single forward rate w = 2k
    let tc = chem.tc(cells.as_slice()).unwrap();
    assert!((tc[0] - 1.0 / k).abs() < 1e-14);
    assert_eq!(tc[1], VGREAT);
}

#[test]
fn opaque_time_scale_uses_bulk_rates() {
    let k = 50.0;
    let mech = Arc::new(Mechanism::species_only(a_to_b(1.0).species().to_vec()).unwrap());
    let coeffs = QssCoeffs::default();
    let chem = QssIntegrator::new(mech, Box::new(OpaqueDecay { k }), coeffs).unwrap();
    let cells = vec![
        ChemicalState::new(vec![0.3, 0.7], 1200.0, 101_325.0),
        ChemicalState::new(vec![0.0, 0.0], 1200.0, 101_325.0),
    ];
    let tc = chem.tc(cells.as_slice()).unwrap();
    assert!((tc[0] - 1.0 / k).abs() < 1e-14);
    assert_eq!(tc[1], VGREAT);

    let err = chem
        .tc(vec![ChemicalState::new(vec![0.3], 1200.0, 1e5)].as_slice())
        .unwrap_err();
    assert!(matches!(err, ChemistryError::Cell { cell: 0, .. }));
}
