//! Chemical species definitions.

use crate::error::{MechanismError, MechanismResult};
use crate::thermo::Thermo;

/// A transported species of the reduced mechanism.
///
/// QSS species never appear here: they live only inside the rate kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Specie {
    name: String,
    /// Molar mass [kg/kmol]
    molar_mass: f64,
    thermo: Thermo,
}

impl Specie {
    pub fn new(name: impl Into<String>, molar_mass: f64, thermo: Thermo) -> Self {
        Self {
            name: name.into(),
            molar_mass,
            thermo,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    pub fn thermo(&self) -> &Thermo {
        &self.thermo
    }

    pub(crate) fn validate(&self) -> MechanismResult<()> {
        let invalid = |what| MechanismError::InvalidSpecie {
            name: self.name.clone(),
            what,
        };
        if self.name.is_empty() {
            return Err(invalid("empty name"));
        }
        if !self.molar_mass.is_finite() || self.molar_mass <= 0.0 {
            return Err(invalid("molar mass must be positive and finite"));
        }
        self.thermo.check().map_err(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_molar_mass() {
        let sp = Specie::new("X", 0.0, Thermo::constant_cp(1.0, 0.0));
        let err = sp.validate().unwrap_err();
        assert!(err.to_string().contains("molar mass"));
    }

    #[test]
    fn accepts_valid_specie() {
        let sp = Specie::new("O2", 31.998, Thermo::constant_cp(29_400.0, 0.0));
        assert!(sp.validate().is_ok());
        assert_eq!(sp.name(), "O2");
    }
}
