//! Marshalling between the integrator's SI state and a rate provider.

use crate::error::{KineticsError, KineticsResult};
use crate::kernel::{KernelBasis, KernelWork, RateProvider};
use qc_core::cgs;
use qc_core::ensure_all_finite;
use qc_mechanism::concentrations_to_mass_fractions;
use std::fmt;

/// Per-workspace buffers for kernel calls.
#[derive(Clone, Debug)]
pub struct KineticsScratch {
    fractions: Vec<f64>,
    rates: Vec<f64>,
    work: KernelWork,
}

impl KineticsScratch {
    pub fn n_species(&self) -> usize {
        self.fractions.len()
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> KineticsResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(KineticsError::KernelMismatch {
            what,
            expected,
            found,
        })
    }
}

fn check_positive(what: &'static str, value: f64) -> KineticsResult<()> {
    if !value.is_finite() {
        return Err(KineticsError::NonFinite { what, value });
    }
    if value <= 0.0 {
        return Err(KineticsError::NonPhysical { what, value });
    }
    Ok(())
}

/// Validated front end to a [`RateProvider`].
///
/// Every call checks array sizes against the provider before it is invoked;
/// a kernel never sees a malformed call.
pub struct RateKernelAdapter {
    provider: Box<dyn RateProvider>,
    molar_masses: Vec<f64>,
    work_sizes: (usize, usize),
}

impl fmt::Debug for RateKernelAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateKernelAdapter")
            .field("n_species", &self.molar_masses.len())
            .field("basis", &self.provider.basis())
            .field("work_sizes", &self.work_sizes)
            .finish()
    }
}

impl RateKernelAdapter {
    /// Bind a provider to the model's molar masses [kg/kmol].
    pub fn new(provider: Box<dyn RateProvider>, molar_masses: Vec<f64>) -> KineticsResult<Self> {
        if provider.n_species() != molar_masses.len() {
            return Err(KineticsError::Configuration {
                what: format!(
                    "rate provider has {} species, model has {}",
                    provider.n_species(),
                    molar_masses.len()
                ),
            });
        }
        if let Some(w) = molar_masses.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(KineticsError::Configuration {
                what: format!("molar mass must be positive, got {w}"),
            });
        }
        let work = provider.new_work();
        Ok(Self {
            work_sizes: (work.ints.len(), work.reals.len()),
            provider,
            molar_masses,
        })
    }

    pub fn provider(&self) -> &dyn RateProvider {
        self.provider.as_ref()
    }

    pub fn n_species(&self) -> usize {
        self.molar_masses.len()
    }

    pub fn basis(&self) -> KernelBasis {
        self.provider.basis()
    }

    pub fn molar_masses(&self) -> &[f64] {
        &self.molar_masses
    }

    /// Buffers sized for this adapter.
    pub fn scratch(&self) -> KineticsScratch {
        let n = self.n_species();
        KineticsScratch {
            fractions: vec![0.0; n],
            rates: vec![0.0; n],
            work: self.provider.new_work(),
        }
    }

    /// Net molar production rates [kmol/(m³ s)] at `(p, t, c)`.
    ///
    /// `p` in Pa, `t` in K, `c` in kmol/m³.
    pub fn rates(
        &self,
        p: f64,
        t: f64,
        c: &[f64],
        scratch: &mut KineticsScratch,
        out: &mut [f64],
    ) -> KineticsResult<()> {
        let n = self.n_species();
        check_len("concentrations", n, c.len())?;
        check_len("production rates", n, out.len())?;
        check_len("fraction buffer", n, scratch.fractions.len())?;
        check_len("rate buffer", n, scratch.rates.len())?;
        check_len("integer work array", self.work_sizes.0, scratch.work.ints.len())?;
        check_len("real work array", self.work_sizes.1, scratch.work.reals.len())?;
        check_positive("pressure", p)?;
        check_positive("temperature", t)?;
        ensure_all_finite(c, "concentration")?;

        let KineticsScratch {
            fractions,
            rates,
            work,
        } = scratch;

        match self.provider.basis() {
            KernelBasis::Concentration => {
                fractions.copy_from_slice(c);
                self.provider.evaluate(p, t, fractions, work, rates)?;
                out.copy_from_slice(rates);
            }
            KernelBasis::MassFractionCgs => {
                concentrations_to_mass_fractions(c, &self.molar_masses, fractions);
                self.provider
                    .evaluate(cgs::pressure(p), t, fractions, work, rates)?;
                for (o, r) in out.iter_mut().zip(rates.iter()) {
                    *o = cgs::rate_to_si(*r);
                }
            }
        }

        ensure_all_finite(out, "production rate")?;
        Ok(())
    }
}
