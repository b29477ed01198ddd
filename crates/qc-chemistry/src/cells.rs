//! Cell collections and the parallel cell loop.

use crate::error::{ChemResult, ChemistryError};
use crate::solver::ChemistrySolver;
use crate::state::ChemicalState;
use rayon::prelude::*;

/// Read-only access to the chemical state of every cell.
pub trait CellStates: Sync {
    fn n_cells(&self) -> usize;
    fn concentrations(&self, cell: usize) -> &[f64];
    fn temperature(&self, cell: usize) -> f64;
    fn pressure(&self, cell: usize) -> f64;
}

impl CellStates for [ChemicalState] {
    fn n_cells(&self) -> usize {
        self.len()
    }

    fn concentrations(&self, cell: usize) -> &[f64] {
        &self[cell].c
    }

    fn temperature(&self, cell: usize) -> f64 {
        self[cell].temperature
    }

    fn pressure(&self, cell: usize) -> f64 {
        self[cell].pressure
    }
}

/// Advance every cell by `delta_t` in parallel.
///
/// Each cell starts from the same `sub_delta_t` hint. Returns the smallest
/// recommended sub-step over all cells (`delta_t` when there are none).
/// Cells that succeeded keep their new state even if another cell fails.
pub fn solve_cells<S: ChemistrySolver + ?Sized>(
    solver: &S,
    cells: &mut [ChemicalState],
    delta_t: f64,
    sub_delta_t: f64,
) -> ChemResult<f64> {
    let min_sub = cells
        .par_iter_mut()
        .enumerate()
        .map(|(cell, state)| {
            let mut sub = sub_delta_t;
            solver
                .solve_state(state, delta_t, &mut sub)
                .map_err(|e| ChemistryError::Cell {
                    cell,
                    source: Box::new(e),
                })?;
            Ok::<f64, ChemistryError>(sub)
        })
        .try_reduce(|| f64::INFINITY, |a, b| Ok(a.min(b)))?;
    Ok(min_sub.min(delta_t))
}
