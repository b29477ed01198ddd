mod demo;

use clap::{Parser, Subcommand};
use qc_chemistry::{
    ChemResult, ChemicalState, ChemistrySelection, config, diagnostics, new_chemistry_solver,
    solve_cells,
};
use qc_core::timing::{self, chemistry_timing};
use qc_kinetics::{MechanismKernel, ReactionRateEvaluator};
use qc_mechanism::ChemistryModel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "qc-cli")]
#[command(about = "QSS chemistry CLI - stiff chemistry integration per cell", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a chemistryProperties file (YAML or JSON)
    Check {
        /// Path to the configuration file
        config_path: PathBuf,
    },
    /// Integrate the built-in hydrogen/air mechanism over a batch of cells
    Run {
        /// Path to the configuration file
        config_path: PathBuf,
        /// Number of cells
        #[arg(long, default_value_t = 8)]
        cells: usize,
        /// Flow time step in seconds
        #[arg(long, default_value_t = 1e-5)]
        dt: f64,
        /// End time in seconds
        #[arg(long, default_value_t = 1e-3)]
        t_end: f64,
        /// Temperature of the first cell in K; each further cell is 25 K hotter
        #[arg(long, default_value_t = 1200.0)]
        t0: f64,
        /// Pressure in Pa
        #[arg(long, default_value_t = 101_325.0)]
        p0: f64,
        /// Log accumulated solve and Jacobian timings
        #[arg(long)]
        timing: bool,
    },
}

fn main() -> ChemResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config_path } => cmd_check(&config_path),
        Commands::Run {
            config_path,
            cells,
            dt,
            t_end,
            t0,
            p0,
            timing,
        } => cmd_run(&config_path, cells, dt, t_end, t0, p0, timing),
    }
}

fn cmd_check(config_path: &Path) -> ChemResult<()> {
    println!("Checking configuration: {}", config_path.display());
    let props = config::load(config_path)?;
    match props.selection()? {
        ChemistrySelection::Qss(coeffs) => {
            println!("✓ QSS chemistry");
            println!("  solver:   {}", coeffs.solver);
            println!("  absTol:   {:e}", coeffs.tolerances.abs);
            println!("  relTol:   {:e}", coeffs.tolerances.rel);
            println!("  maxSteps: {}", coeffs.max_steps);
            println!("  minStep:  {:e} s", coeffs.min_step);
            println!("  jacobian: {}", coeffs.jacobian);
        }
        ChemistrySelection::None => println!("✓ Chemistry disabled"),
    }
    Ok(())
}

fn cmd_run(
    config_path: &Path,
    n_cells: usize,
    dt: f64,
    t_end: f64,
    t0: f64,
    p0: f64,
    show_timing: bool,
) -> ChemResult<()> {
    if !(dt > 0.0 && dt.is_finite()) || !(t_end >= 0.0 && t_end.is_finite()) {
        return Err(qc_chemistry::ChemistryError::InvalidArg {
            what: format!("need dt > 0 and t_end >= 0, got dt = {dt}, t_end = {t_end}"),
        });
    }
    if show_timing {
        timing::enable_timing();
        chemistry_timing::reset_all();
    }

    let props = config::load(config_path)?;
    let model = Arc::new(demo::mechanism()?);
    let kernel = MechanismKernel::new(Arc::clone(&model));
    let solver = new_chemistry_solver(&props, Arc::clone(&model), Box::new(kernel))?;

    let mut cells: Vec<ChemicalState> = (0..n_cells)
        .map(|i| {
            let t = t0 + 25.0 * i as f64;
            ChemicalState::new(demo::stoichiometric_air(t, p0), t, p0)
        })
        .collect();

    println!(
        "Running {} chemistry on {} cells: dt = {:e} s, t_end = {:e} s",
        solver.name(),
        n_cells,
        dt,
        t_end
    );

    let started = Instant::now();
    let mut time = 0.0;
    let mut sub_dt = dt;
    let mut steps = 0usize;
    while time < t_end {
        let step = dt.min(t_end - time);
        sub_dt = solve_cells(solver.as_ref(), &mut cells, step, sub_dt)?;
        time += step;
        steps += 1;
        tracing::debug!(time, sub_dt, "flow step");
    }
    println!(
        "✓ {} flow steps in {:.3} s (last chemical sub-step {:e} s)",
        steps,
        started.elapsed().as_secs_f64(),
        sub_dt
    );

    let evaluator = ReactionRateEvaluator::with_mechanism_kernel(Arc::clone(&model))?;
    let tc = diagnostics::tc(&evaluator, cells.as_slice())?;
    let rr_h2o = diagnostics::calculate_rr(&evaluator, 0, demo::H2O, cells.as_slice())?;

    let names: Vec<&str> = model.species().iter().map(|s| s.name()).collect();
    println!();
    println!(
        "{:>5} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "cell", "T [K]", names[0], names[1], names[2], names[3], "tc [s]", "RR_H2O [kg/m3s]"
    );
    for (i, state) in cells.iter().enumerate() {
        println!(
            "{:>5} {:>10.2} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e} {:>14.4e}",
            i,
            state.temperature,
            state.c[0],
            state.c[1],
            state.c[2],
            state.c[3],
            tc[i],
            rr_h2o[i]
        );
    }

    if show_timing {
        chemistry_timing::log_summary();
    }
    Ok(())
}
