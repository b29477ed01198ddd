// qc-core/src/units.rs

use uom::si::f64::{
    Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature,
    Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn to_pa(p: Pressure) -> f64 {
    use uom::si::pressure::pascal;
    p.get::<pascal>()
}

#[inline]
pub fn to_kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

#[inline]
pub fn to_seconds(t: Time) -> f64 {
    use uom::si::time::second;
    t.get::<second>()
}

pub mod constants {
    /// Universal gas constant [J/(kmol K)].
    pub const R_UNIVERSAL: f64 = 8314.462_618;
    /// Standard-state pressure for equilibrium constants [Pa].
    pub const P_STD: f64 = 1.0e5;
    /// Universal gas constant in CGS [erg/(mol K)].
    pub const R_UNIVERSAL_CGS: f64 = 8.314_462_618e7;
}

/// Conversions across the CGS kernel boundary.
pub mod cgs {
    /// Pa -> dyn/cm².
    pub const PRESSURE_TO_CGS: f64 = 10.0;
    /// mol/(cm³ s) -> kmol/(m³ s).
    pub const RATE_TO_SI: f64 = 1.0e3;

    #[inline]
    pub fn pressure(p_pa: f64) -> f64 {
        p_pa * PRESSURE_TO_CGS
    }

    #[inline]
    pub fn rate_to_si(wdot: f64) -> f64 {
        wdot * RATE_TO_SI
    }
}
