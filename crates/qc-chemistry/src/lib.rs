//! qc-chemistry: cell-by-cell stiff chemistry integration.
//!
//! Provides:
//! - `QssIntegrator`, advancing one cell's concentrations, temperature and
//!   pressure over a time step
//! - `ChemistrySolver` and run-time selection from `chemistryProperties`
//!   configuration
//! - Diagnostics: per-reaction mass rates and chemical time scales
//! - `solve_cells`, a parallel loop over independent cells
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use qc_chemistry::{QssCoeffs, QssIntegrator};
//! use qc_mechanism::{Arrhenius, Mechanism, Reaction, Specie, Thermo};
//!
//! let th = Thermo::constant_cp(30_000.0, 0.0);
//! let mech = Mechanism::new(
//!     vec![Specie::new("A", 28.0, th.clone()), Specie::new("B", 28.0, th)],
//!     vec![Reaction::irreversible("A=>B", Arrhenius::new(100.0, 0.0, 0.0))
//!         .reactant(0, 1.0)
//!         .product(1, 1.0)],
//! )
//! .unwrap();
//! let chem = QssIntegrator::with_mechanism(Arc::new(mech), QssCoeffs::default()).unwrap();
//!
//! let mut c = [1.0, 0.0];
//! let (mut t, mut p) = (1000.0, 101_325.0);
//! let mut sub_dt = 0.0;
//! chem.solve(&mut c, &mut t, &mut p, 1e-3, &mut sub_dt).unwrap();
//! assert!(c[0] < 1.0 && c[1] > 0.0);
//! ```

pub mod cells;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod integrator;
pub mod solver;
pub mod state;
pub mod workspace;

mod system;

pub use cells::{CellStates, solve_cells};
pub use config::{
    ChemistryProperties, ChemistrySelection, ChemistryTypeDef, QssCoeffs, QssCoeffsDef,
};
pub use error::{ChemResult, ChemistryError};
pub use integrator::QssIntegrator;
pub use solver::{ChemistrySolver, NoChemistry, new_chemistry_solver};
pub use state::ChemicalState;
pub use workspace::Workspace;
