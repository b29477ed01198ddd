//! Conversions between molar concentrations and mass fractions.

/// Convert concentrations [kmol/m³] to mass fractions.
///
/// `Y_i = c_i W_i / Σ c_j W_j`. An empty mixture (zero total mass) maps to
/// all-zero fractions.
pub fn concentrations_to_mass_fractions(c: &[f64], molar_masses: &[f64], y: &mut [f64]) {
    let total: f64 = c.iter().zip(molar_masses).map(|(ci, wi)| ci * wi).sum();
    if total.abs() <= qc_core::VSMALL {
        y.fill(0.0);
        return;
    }
    for ((yi, ci), wi) in y.iter_mut().zip(c).zip(molar_masses) {
        *yi = ci * wi / total;
    }
}

/// Convert mass fractions to concentrations [kmol/m³] at density `rho` [kg/m³].
pub fn mass_fractions_to_concentrations(rho: f64, y: &[f64], molar_masses: &[f64], c: &mut [f64]) {
    for ((ci, yi), wi) in c.iter_mut().zip(y).zip(molar_masses) {
        *ci = rho * yi / wi;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mixture_gives_zero_fractions() {
        let mut y = [1.0; 2];
        concentrations_to_mass_fractions(&[0.0, 0.0], &[2.0, 32.0], &mut y);
        assert_eq!(y, [0.0, 0.0]);
    }

    #[test]
    fn stoichiometric_hydrogen_oxygen() {
        // 2 H2 + O2 by moles: mass fractions 4/36 and 32/36
        let mut y = [0.0; 2];
        concentrations_to_mass_fractions(&[2.0, 1.0], &[2.0, 32.0], &mut y);
        assert!((y[0] - 4.0 / 36.0).abs() < 1e-14);
        assert!((y[1] - 32.0 / 36.0).abs() < 1e-14);
    }

    #[test]
    fn round_trip_through_density() {
        let w = [2.0, 32.0, 28.0];
        let c = [0.3, 0.1, 0.5];
        let rho: f64 = c.iter().zip(&w).map(|(ci, wi)| ci * wi).sum();
        let mut y = [0.0; 3];
        concentrations_to_mass_fractions(&c, &w, &mut y);
        let mut back = [0.0; 3];
        mass_fractions_to_concentrations(rho, &y, &w, &mut back);
        for (a, b) in c.iter().zip(&back) {
            assert!((a - b).abs() < 1e-14);
        }
    }
}
