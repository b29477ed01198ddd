//! qc-mechanism: reaction mechanism description for QSS chemistry.
//!
//! Provides:
//! - Species with molar mass and a thermodynamic model
//! - Thermodynamic models (constant cp, NASA 7-coefficient polynomials)
//! - Reaction descriptors (stoichiometry, Arrhenius rates, reversibility,
//!   third-body efficiencies)
//! - `ChemistryModel`, the capability set the integrator is generic over
//! - Concentration / mass-fraction conversions
//!
//! The mechanism is assembled in code; reading mechanism files is left to
//! whatever generates the rate kernel.
//!
//! # Example
//!
//! ```
//! use qc_mechanism::{Arrhenius, Mechanism, Reaction, Specie, Thermo};
//!
//! let thermo = Thermo::constant_cp(29_000.0, 0.0);
//! let species = vec![
//!     Specie::new("A", 28.0, thermo.clone()),
//!     Specie::new("B", 28.0, thermo),
//! ];
//! let a_to_b = Reaction::irreversible("A=>B", Arrhenius::new(1.0e3, 0.0, 0.0))
//!     .reactant(0, 1.0)
//!     .product(1, 1.0);
//! let mechanism = Mechanism::new(species, vec![a_to_b]).unwrap();
//! assert_eq!(mechanism.specie_index("B"), Some(1));
//! ```

pub mod composition;
pub mod error;
pub mod mechanism;
pub mod model;
pub mod reaction;
pub mod species;
pub mod thermo;

pub use composition::{concentrations_to_mass_fractions, mass_fractions_to_concentrations};
pub use error::{MechanismError, MechanismResult};
pub use mechanism::Mechanism;
pub use model::{ChemistryModel, validate_model};
pub use reaction::{Arrhenius, Reaction, Reversibility, SpecieCoeff, ThirdBody};
pub use species::Specie;
pub use thermo::Thermo;
