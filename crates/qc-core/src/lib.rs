//! qc-core: shared foundation for the QSS chemistry workspace.
//!
//! Contains:
//! - units (uom SI types, constructors and kernel unit conversions)
//! - numeric (Real, tolerances, scaled error norms, float helpers)
//! - timing (opt-in accumulating timers for kernel and cell solves)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
