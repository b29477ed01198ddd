//! Reaction-rate fields and chemical time scales over a set of cells.

use crate::cells::CellStates;
use crate::error::{ChemResult, ChemistryError};
use qc_core::VGREAT;
use qc_kinetics::ReactionRateEvaluator;
use qc_mechanism::{ChemistryModel, MechanismError};
use rayon::prelude::*;

fn in_cell<T>(cell: usize, result: ChemResult<T>) -> ChemResult<T> {
    result.map_err(|e| ChemistryError::Cell {
        cell,
        source: Box::new(e),
    })
}

/// Mass production rate [kg/(m³ s)] of `specie` by reaction `reaction`
/// in every cell.
pub fn calculate_rr<M, C>(
    evaluator: &ReactionRateEvaluator<M>,
    reaction: usize,
    specie: usize,
    cells: &C,
) -> ChemResult<Vec<f64>>
where
    M: ChemistryModel,
    C: CellStates + ?Sized,
{
    let model = evaluator.model();
    let r = model
        .reactions()
        .get(reaction)
        .ok_or(MechanismError::ReactionIndexOob {
            index: reaction,
            n_reactions: model.n_reactions(),
        })?;
    let sp = model
        .species()
        .get(specie)
        .ok_or(MechanismError::SpecieOutOfRange {
            index: specie,
            n_species: model.n_species(),
        })?;
    let scale = r.net_stoich(specie) * sp.molar_mass();

    (0..cells.n_cells())
        .into_par_iter()
        .map(|cell| {
            let rate = evaluator
                .omega_i(
                    reaction,
                    cells.concentrations(cell),
                    cells.temperature(cell),
                    cells.pressure(cell),
                )
                .map_err(ChemistryError::from);
            in_cell(cell, rate).map(|rate| scale * rate.net)
        })
        .collect()
}

/// Chemical time scale [s] of every cell.
///
/// With the model's reactions available this is `Σc Σw / Σw²` over the
/// forward and reverse molar rates `w` of every reaction, each weighted by
/// the stoichiometry of the side it produces. For an opaque rate provider
/// it falls back to `Σc / Σ|ω|`. A vanishing denominator gives `VGREAT`.
pub fn tc<M, C>(evaluator: &ReactionRateEvaluator<M>, cells: &C) -> ChemResult<Vec<f64>>
where
    M: ChemistryModel,
    C: CellStates + ?Sized,
{
    let n = evaluator.n_species();
    if evaluator.mirrors_mechanism() {
        (0..cells.n_cells())
            .into_par_iter()
            .map(|cell| in_cell(cell, reaction_time_scale(evaluator, cells, cell)))
            .collect()
    } else {
        (0..cells.n_cells())
            .into_par_iter()
            .map_init(
                || (evaluator.scratch(), vec![0.0; n]),
                |(scratch, omega), cell| {
                    let c = cells.concentrations(cell);
                    let result = evaluator
                        .omega_into(
                            c,
                            cells.temperature(cell),
                            cells.pressure(cell),
                            scratch,
                            omega,
                        )
                        .map_err(ChemistryError::from)
                        .map(|()| {
                            let c_sum: f64 = c.iter().sum();
                            let w_sum: f64 = omega.iter().map(|w| w.abs()).sum();
                            ratio(c_sum, w_sum)
                        });
                    in_cell(cell, result)
                },
            )
            .collect()
    }
}

fn reaction_time_scale<M, C>(
    evaluator: &ReactionRateEvaluator<M>,
    cells: &C,
    cell: usize,
) -> ChemResult<f64>
where
    M: ChemistryModel,
    C: CellStates + ?Sized,
{
    let c = cells.concentrations(cell);
    let (t, p) = (cells.temperature(cell), cells.pressure(cell));
    let mut w_sum = 0.0;
    let mut w_sq_sum = 0.0;
    for (i, reaction) in evaluator.model().reactions().iter().enumerate() {
        let rate = evaluator.omega_i(i, c, t, p)?;
        let nu_rhs: f64 = reaction.rhs().iter().map(|sc| sc.stoich_coeff).sum();
        let nu_lhs: f64 = reaction.lhs().iter().map(|sc| sc.stoich_coeff).sum();
        for w in [rate.forward() * nu_rhs, rate.reverse() * nu_lhs] {
            w_sum += w;
            w_sq_sum += w * w;
        }
    }
    let c_sum: f64 = c.iter().sum();
    Ok(ratio(c_sum * w_sum, w_sq_sum))
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { VGREAT } else { (num / den).min(VGREAT) }
}
