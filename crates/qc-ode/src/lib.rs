//! qc-ode: stiff ODE integration for chemistry source terms.
//!
//! Provides:
//! - `OdeSystem`, the right-hand side and Jacobian of a stiff system
//! - `OdeSolver`, an adaptive step-size driver over three schemes
//!   (`seulex`, `Rosenbrock12`, `EulerImplicit`)
//! - Newton iteration and finite-difference Jacobian helpers

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod options;
pub mod solver;
pub mod system;

mod euler_implicit;
mod rosenbrock;
mod seulex;
mod stepper;

pub use error::{OdeError, OdeResult};
pub use jacobian::{
    FD_EPSILON, central_difference_jacobian, finite_difference_columns,
    finite_difference_jacobian, perturbation,
};
pub use newton::{NewtonConfig, NewtonResult, NonlinearProblem, newton_solve};
pub use options::OdeOptions;
pub use solver::{OdeSolver, OdeSolverKind, OdeStats, StepState};
pub use system::OdeSystem;
