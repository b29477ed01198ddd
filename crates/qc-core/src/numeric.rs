use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Threshold below which a concentration is treated as exhausted.
pub const SMALL: Real = 1.0e-15;
/// Guard against division by an exact or denormal zero.
pub const VSMALL: Real = 1.0e-300;
/// Stand-in for an infinite time scale.
pub const VGREAT: Real = 1.0e300;

/// Absolute/relative tolerance pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Both tolerances must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), CoreError> {
        ensure_finite(self.abs, "absolute tolerance")?;
        ensure_finite(self.rel, "relative tolerance")?;
        if self.abs <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: "absolute tolerance must be positive",
            });
        }
        if self.rel <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: "relative tolerance must be positive",
            });
        }
        Ok(())
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Check every entry of `values` is finite.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), CoreError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(CoreError::NonFinite { what, value }),
        None => Ok(()),
    }
}

/// Max-norm of an error estimate scaled component-wise by
/// `abs + rel * max(|y0_i|, |y_i|)`.
///
/// A value `<= 1` means the estimate is within tolerance. Non-finite
/// estimates map to infinity so callers always reject them.
pub fn scaled_error_norm(y0: &[Real], y: &[Real], err: &[Real], tol: Tolerances) -> Real {
    let mut max_err: Real = 0.0;
    for ((&a, &b), &e) in y0.iter().zip(y).zip(err) {
        let scale = tol.abs + tol.rel * a.abs().max(b.abs());
        let ratio = e.abs() / scale;
        if !ratio.is_finite() {
            return Real::INFINITY;
        }
        max_err = max_err.max(ratio);
    }
    max_err
}
