//! Per-species thermodynamic models.
//!
//! All quantities are molar and SI: cp and s in J/(kmol K), h and g in J/kmol.

use qc_core::constants::R_UNIVERSAL;

/// Reference temperature for constant-cp data [K].
pub const T_STD: f64 = 298.15;

/// Thermodynamic model of a single species.
#[derive(Debug, Clone, PartialEq)]
pub enum Thermo {
    /// Temperature-independent heat capacity.
    ConstantCp {
        /// Heat capacity [J/(kmol K)]
        cp: f64,
        /// Enthalpy of formation at `t_ref` [J/kmol]
        hf: f64,
        /// Standard entropy at `t_ref` [J/(kmol K)]
        sf: f64,
        /// Reference temperature [K]
        t_ref: f64,
    },
    /// NASA 7-coefficient polynomials, two temperature ranges.
    Nasa7 {
        t_low: f64,
        t_common: f64,
        t_high: f64,
        low: [f64; 7],
        high: [f64; 7],
    },
}

impl Thermo {
    /// Constant-cp model referenced to 298.15 K with zero standard entropy.
    pub fn constant_cp(cp: f64, hf: f64) -> Self {
        Thermo::ConstantCp {
            cp,
            hf,
            sf: 0.0,
            t_ref: T_STD,
        }
    }

    /// Validate the model parameters; returns a description of the first problem.
    pub fn check(&self) -> Result<(), &'static str> {
        match self {
            Thermo::ConstantCp { cp, hf, sf, t_ref } => {
                if !(cp.is_finite() && hf.is_finite() && sf.is_finite() && t_ref.is_finite()) {
                    return Err("non-finite thermo coefficient");
                }
                if *cp <= 0.0 {
                    return Err("heat capacity must be positive");
                }
                if *t_ref <= 0.0 {
                    return Err("reference temperature must be positive");
                }
                Ok(())
            }
            Thermo::Nasa7 {
                t_low,
                t_common,
                t_high,
                low,
                high,
            } => {
                if !(*t_low > 0.0 && t_low < t_common && t_common < t_high) {
                    return Err("NASA temperature ranges must satisfy 0 < Tlow < Tcommon < Thigh");
                }
                if low.iter().chain(high.iter()).any(|a| !a.is_finite()) {
                    return Err("non-finite NASA coefficient");
                }
                Ok(())
            }
        }
    }

    fn nasa_coeffs(t: f64, t_common: f64, low: &[f64; 7], high: &[f64; 7]) -> [f64; 7] {
        if t <= t_common { *low } else { *high }
    }

    /// Molar heat capacity at constant pressure.
    pub fn cp(&self, t: f64) -> f64 {
        match self {
            Thermo::ConstantCp { cp, .. } => *cp,
            Thermo::Nasa7 {
                t_common, low, high, ..
            } => {
                let a = Self::nasa_coeffs(t, *t_common, low, high);
                R_UNIVERSAL * ((((a[4] * t + a[3]) * t + a[2]) * t + a[1]) * t + a[0])
            }
        }
    }

    /// Molar absolute enthalpy (formation + sensible).
    pub fn h(&self, t: f64) -> f64 {
        match self {
            Thermo::ConstantCp { cp, hf, t_ref, .. } => hf + cp * (t - t_ref),
            Thermo::Nasa7 {
                t_common, low, high, ..
            } => {
                let a = Self::nasa_coeffs(t, *t_common, low, high);
                R_UNIVERSAL
                    * (((((a[4] / 5.0 * t + a[3] / 4.0) * t + a[2] / 3.0) * t + a[1] / 2.0) * t
                        + a[0])
                        * t
                        + a[5])
            }
        }
    }

    /// Molar standard-state entropy.
    pub fn s(&self, t: f64) -> f64 {
        match self {
            Thermo::ConstantCp { cp, sf, t_ref, .. } => sf + cp * (t / t_ref).ln(),
            Thermo::Nasa7 {
                t_common, low, high, ..
            } => {
                let a = Self::nasa_coeffs(t, *t_common, low, high);
                R_UNIVERSAL
                    * (a[0] * t.ln()
                        + (((a[4] / 4.0 * t + a[3] / 3.0) * t + a[2] / 2.0) * t + a[1]) * t
                        + a[6])
            }
        }
    }

    /// Molar standard-state Gibbs free energy.
    pub fn g(&self, t: f64) -> f64 {
        self.h(t) - t * self.s(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // N2 (GRI-Mech 3.0)
    fn nitrogen() -> Thermo {
        Thermo::Nasa7 {
            t_low: 300.0,
            t_common: 1000.0,
            t_high: 5000.0,
            low: [
                3.298677,
                1.4082404e-3,
                -3.963222e-6,
                5.641515e-9,
                -2.444854e-12,
                -1020.8999,
                3.950372,
            ],
            high: [
                2.92664,
                1.4879768e-3,
                -5.68476e-7,
                1.0097038e-10,
                -6.753351e-15,
                -922.7977,
                5.980528,
            ],
        }
    }

    #[test]
    fn constant_cp_enthalpy_is_linear() {
        let th = Thermo::constant_cp(30_000.0, -1.0e8);
        assert_eq!(th.cp(1500.0), 30_000.0);
        assert!((th.h(T_STD) + 1.0e8).abs() < 1e-6);
        assert!((th.h(T_STD + 100.0) - (-1.0e8 + 3.0e6)).abs() < 1e-6);
        assert!(th.s(T_STD).abs() < 1e-12);
    }

    #[test]
    fn nasa_nitrogen_cp_near_reference() {
        // cp(N2, 300 K) ≈ 29.1 kJ/(kmol K)
        let cp = nitrogen().cp(300.0);
        assert!((cp - 29_100.0).abs() < 200.0, "cp = {cp}");
    }

    #[test]
    fn nasa_ranges_are_nearly_continuous() {
        let th = nitrogen();
        let below = th.h(1000.0);
        let above = th.h(1000.0 + 1e-9);
        assert!((below - above).abs() / below.abs().max(1.0) < 1e-3);
        // formation enthalpy of N2 is zero
        assert!(th.h(T_STD).abs() < 50_000.0);
    }

    #[test]
    fn gibbs_combines_h_and_s() {
        let th = nitrogen();
        let t = 1200.0;
        assert!((th.g(t) - (th.h(t) - t * th.s(t))).abs() < 1e-6);
    }

    #[test]
    fn check_rejects_bad_data() {
        assert!(Thermo::constant_cp(-1.0, 0.0).check().is_err());
        let mut bad = nitrogen();
        if let Thermo::Nasa7 { t_common, .. } = &mut bad {
            *t_common = 10_000.0;
        }
        assert!(bad.check().is_err());
        assert!(nitrogen().check().is_ok());
    }
}
