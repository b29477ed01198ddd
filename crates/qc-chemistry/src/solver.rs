//! Chemistry solver interface and run-time selection.

use crate::config::{ChemistryProperties, ChemistrySelection};
use crate::error::{ChemResult, ChemistryError};
use crate::integrator::QssIntegrator;
use crate::state::ChemicalState;
use qc_kinetics::RateProvider;
use qc_mechanism::ChemistryModel;
use std::sync::Arc;

/// Advances the chemistry of one cell over a time step.
pub trait ChemistrySolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn n_species(&self) -> usize;

    /// Advance `c`, `t` and `p` by `delta_t`; `sub_delta_t` carries the
    /// recommended internal step in and out.
    fn solve(
        &self,
        c: &mut [f64],
        t: &mut f64,
        p: &mut f64,
        delta_t: f64,
        sub_delta_t: &mut f64,
    ) -> ChemResult<()>;

    fn solve_state(
        &self,
        state: &mut ChemicalState,
        delta_t: f64,
        sub_delta_t: &mut f64,
    ) -> ChemResult<()> {
        let ChemicalState {
            c,
            temperature,
            pressure,
        } = state;
        self.solve(c, temperature, pressure, delta_t, sub_delta_t)
    }
}

impl<M: ChemistryModel> ChemistrySolver for QssIntegrator<M> {
    fn name(&self) -> &'static str {
        "QSS"
    }

    fn n_species(&self) -> usize {
        QssIntegrator::n_species(self)
    }

    fn solve(
        &self,
        c: &mut [f64],
        t: &mut f64,
        p: &mut f64,
        delta_t: f64,
        sub_delta_t: &mut f64,
    ) -> ChemResult<()> {
        QssIntegrator::solve(self, c, t, p, delta_t, sub_delta_t)
    }
}

/// Chemistry switched off: the state is left as it is.
#[derive(Clone, Copy, Debug)]
pub struct NoChemistry {
    n_species: usize,
}

impl NoChemistry {
    pub fn new(n_species: usize) -> Self {
        Self { n_species }
    }
}

impl ChemistrySolver for NoChemistry {
    fn name(&self) -> &'static str {
        "none"
    }

    fn n_species(&self) -> usize {
        self.n_species
    }

    fn solve(
        &self,
        c: &mut [f64],
        _t: &mut f64,
        _p: &mut f64,
        delta_t: f64,
        sub_delta_t: &mut f64,
    ) -> ChemResult<()> {
        if c.len() != self.n_species {
            return Err(ChemistryError::StateSize {
                expected: self.n_species,
                found: c.len(),
            });
        }
        if !delta_t.is_finite() || delta_t < 0.0 {
            return Err(ChemistryError::InvalidArg {
                what: format!("deltaT must be finite and >= 0, got {delta_t}"),
            });
        }
        *sub_delta_t = delta_t;
        Ok(())
    }
}

/// Build the solver named by `props.chemistryType.chemistrySolver`.
pub fn new_chemistry_solver<M: ChemistryModel + 'static>(
    props: &ChemistryProperties,
    model: Arc<M>,
    provider: Box<dyn RateProvider>,
) -> ChemResult<Box<dyn ChemistrySolver>> {
    let solver: Box<dyn ChemistrySolver> = match props.selection()? {
        ChemistrySelection::Qss(coeffs) => Box::new(QssIntegrator::new(model, provider, coeffs)?),
        ChemistrySelection::None => Box::new(NoChemistry::new(model.n_species())),
    };
    tracing::info!(solver = solver.name(), "selected chemistry solver");
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_chemistry_returns_full_step() {
        let none = NoChemistry::new(2);
        let mut state = ChemicalState::new(vec![1.0, 2.0], 300.0, 1e5);
        let mut sub = 1e-9;
        none.solve_state(&mut state, 1e-3, &mut sub).unwrap();
        assert_eq!(state, ChemicalState::new(vec![1.0, 2.0], 300.0, 1e5));
        assert_eq!(sub, 1e-3);

        let mut wrong = ChemicalState::new(vec![1.0], 300.0, 1e5);
        assert!(none.solve_state(&mut wrong, 1e-3, &mut sub).is_err());
    }
}
