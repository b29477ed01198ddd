//! Integration controls.

use crate::error::{OdeError, OdeResult};
use qc_core::Tolerances;

/// Error tolerances and step limits for one call to [`crate::OdeSolver::solve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OdeOptions {
    pub tolerances: Tolerances,
    /// Maximum number of accepted steps
    pub max_steps: usize,
    /// Smallest step before the integration is abandoned
    pub min_step: f64,
}

impl Default for OdeOptions {
    fn default() -> Self {
        Self {
            tolerances: Tolerances {
                abs: 1e-12,
                rel: 1e-4,
            },
            max_steps: 10_000,
            min_step: 1e-20,
        }
    }
}

impl OdeOptions {
    pub fn validate(&self) -> OdeResult<()> {
        self.tolerances.validate()?;
        if self.max_steps == 0 {
            return Err(OdeError::InvalidArg {
                what: "max_steps must be at least 1".to_string(),
            });
        }
        if !self.min_step.is_finite() || self.min_step <= 0.0 {
            return Err(OdeError::InvalidArg {
                what: format!("min_step must be positive and finite, got {}", self.min_step),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        OdeOptions::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_limits() {
        let opts = OdeOptions {
            max_steps: 0,
            ..OdeOptions::default()
        };
        assert!(opts.validate().is_err());

        let opts = OdeOptions {
            min_step: -1.0,
            ..OdeOptions::default()
        };
        assert!(opts.validate().is_err());

        let opts = OdeOptions {
            tolerances: Tolerances { abs: 1e-12, rel: 0.0 },
            ..OdeOptions::default()
        };
        assert!(matches!(opts.validate(), Err(OdeError::InvalidArg { .. })));
    }
}
