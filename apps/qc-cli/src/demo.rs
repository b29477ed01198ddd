//! Built-in hydrogen/air mechanism for demonstration runs.

use qc_core::units::constants::R_UNIVERSAL;
use qc_mechanism::{Arrhenius, Mechanism, MechanismResult, Reaction, Specie, Thermo, ThirdBody};

pub const H2: usize = 0;
pub const O2: usize = 1;
pub const H2O: usize = 2;
pub const N2: usize = 3;

/// Global two-step hydrogen oxidation with inert nitrogen.
pub fn mechanism() -> MechanismResult<Mechanism> {
    let species = vec![
        Specie::new("H2", 2.016, Thermo::constant_cp(29_000.0, 0.0)),
        Specie::new("O2", 31.998, Thermo::constant_cp(33_000.0, 0.0)),
        Specie::new("H2O", 18.015, Thermo::constant_cp(41_000.0, -2.418e8)),
        Specie::new("N2", 28.014, Thermo::constant_cp(30_000.0, 0.0)),
    ];
    let reactions = vec![
        Reaction::irreversible("2H2+O2=>2H2O", Arrhenius::new(1.0e9, 0.0, 12_000.0))
            .reactant_with_order(H2, 2.0, 1.0)
            .reactant(O2, 1.0)
            .product(H2O, 2.0),
        Reaction::irreversible("H2O+M=>H2+0.5O2+M", Arrhenius::new(1.0e8, 0.0, 50_000.0))
            .reactant(H2O, 1.0)
            .product(H2, 1.0)
            .product(O2, 0.5)
            .with_third_body(ThirdBody::uniform().with_efficiency(H2O, 6.0)),
    ];
    Mechanism::new(species, reactions)
}

/// Stoichiometric hydrogen/air concentrations at `t` [K] and `p` [Pa].
pub fn stoichiometric_air(t: f64, p: f64) -> Vec<f64> {
    let total = p / (R_UNIVERSAL * t);
    let mut c = vec![0.0; 4];
    c[H2] = 0.296 * total;
    c[O2] = 0.148 * total;
    c[N2] = 0.556 * total;
    c
}
