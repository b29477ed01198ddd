//! Chemical state of one cell.

use qc_core::units::{Pressure, Temperature, to_kelvin, to_pa};

/// Species concentrations [kmol/m³] with temperature [K] and pressure [Pa].
#[derive(Clone, Debug, PartialEq)]
pub struct ChemicalState {
    pub c: Vec<f64>,
    pub temperature: f64,
    pub pressure: f64,
}

impl ChemicalState {
    pub fn new(c: Vec<f64>, temperature: f64, pressure: f64) -> Self {
        Self {
            c,
            temperature,
            pressure,
        }
    }

    pub fn from_quantities(c: Vec<f64>, temperature: Temperature, pressure: Pressure) -> Self {
        Self::new(c, to_kelvin(temperature), to_pa(pressure))
    }

    pub fn n_species(&self) -> usize {
        self.c.len()
    }

    /// Total concentration Σc [kmol/m³].
    pub fn total_concentration(&self) -> f64 {
        self.c.iter().sum()
    }
}
