//! qc-kinetics: production rates and Jacobians for the chemistry integrator.
//!
//! Layers, leaf first:
//! - `RateProvider`: a source of net production rates, either the model's
//!   own reactions (`MechanismKernel`) or a compiled `ckwyp` routine
//!   (`CkwypKernel`)
//! - `RateKernelAdapter`: size checks and unit marshalling at the provider
//!   boundary
//! - `ReactionRateEvaluator`: bulk and per-reaction rates with limiter
//!   bookkeeping
//! - `JacobianAssembler`: right-hand side and Jacobian of the `[c, T, p]`
//!   system

pub mod adapter;
pub mod ckwyp;
pub mod error;
pub mod evaluator;
pub mod jacobian;
pub mod kernel;
pub mod mechanism_kernel;

pub use adapter::{KineticsScratch, RateKernelAdapter};
pub use ckwyp::{CkwypFn, CkwypKernel};
pub use error::{KineticsError, KineticsResult};
pub use evaluator::{ReactionRate, ReactionRateEvaluator};
pub use jacobian::{JacobianAssembler, JacobianMethod};
pub use kernel::{KernelBasis, KernelWork, RateProvider};
pub use mechanism_kernel::MechanismKernel;
