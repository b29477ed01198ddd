//! Binding to a compiled CHEMKIN-style `ckwyp` routine.
//!
//! Reduced QSS mechanisms are commonly shipped as generated Fortran that
//! computes production rates of the transported species from pressure,
//! temperature and mass fractions. Loading the shared library that provides
//! the symbol is up to the caller; this module only wraps the function
//! pointer with a validated, sized call.

use crate::error::KineticsResult;
use crate::kernel::{KernelBasis, KernelWork, RateProvider};
use std::ffi::c_int;

/// `ckwyp_(p, T, y, ickwrk, rckwrk, wdot)`, CGS units.
pub type CkwypFn = unsafe extern "C" fn(
    p: *mut f64,
    t: *mut f64,
    y: *mut f64,
    ickwrk: *mut c_int,
    rckwrk: *mut f64,
    wdot: *mut f64,
);

/// Rate provider backed by a `ckwyp` routine.
#[derive(Clone, Debug)]
pub struct CkwypKernel {
    func: CkwypFn,
    n_species: usize,
    ickwrk: Vec<i32>,
    rckwrk: Vec<f64>,
}

impl CkwypKernel {
    /// Wrap `func` for a mechanism with `n_species` transported species.
    ///
    /// `ickwrk` and `rckwrk` are the initial work arrays handed to every
    /// call (each workspace gets its own copy).
    ///
    /// # Safety
    ///
    /// `func` must have the `ckwyp_` signature, read exactly `n_species`
    /// mass fractions, write exactly `n_species` rates, and stay within the
    /// given work arrays.
    pub unsafe fn new(func: CkwypFn, n_species: usize, ickwrk: Vec<i32>, rckwrk: Vec<f64>) -> Self {
        Self {
            func,
            n_species,
            ickwrk,
            rckwrk,
        }
    }
}

impl RateProvider for CkwypKernel {
    fn n_species(&self) -> usize {
        self.n_species
    }

    fn basis(&self) -> KernelBasis {
        KernelBasis::MassFractionCgs
    }

    fn new_work(&self) -> KernelWork {
        KernelWork {
            ints: self.ickwrk.clone(),
            reals: self.rckwrk.clone(),
        }
    }

    fn evaluate(
        &self,
        p: f64,
        t: f64,
        fractions: &mut [f64],
        work: &mut KernelWork,
        rates: &mut [f64],
    ) -> KineticsResult<()> {
        let mut p = p;
        let mut t = t;
        // SAFETY: the adapter checked `fractions`, `rates` and the work
        // arrays against this kernel's sizes; `new` documents the rest.
        unsafe {
            (self.func)(
                &mut p,
                &mut t,
                fractions.as_mut_ptr(),
                work.ints.as_mut_ptr(),
                work.reals.as_mut_ptr(),
                rates.as_mut_ptr(),
            );
        }
        Ok(())
    }
}
