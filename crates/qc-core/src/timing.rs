//! Lightweight performance timing utilities.
//!
//! Timers are off unless enabled programmatically or through the
//! `QC_TIMING` environment variable. The environment is read once.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);
static ENV_ENABLED: OnceLock<bool> = OnceLock::new();

/// Turn timers on for the rest of the process.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// True when timers were enabled in code or via `QC_TIMING`.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
        || *ENV_ENABLED.get_or_init(|| std::env::var("QC_TIMING").is_ok())
}

/// Wall-clock span for one measured call.
pub struct Timer {
    start: Option<Instant>,
}

impl Timer {
    /// Start a timer; a disabled timer never reads the clock.
    pub fn start() -> Self {
        Self {
            start: is_enabled().then(Instant::now),
        }
    }

    /// Elapsed seconds, or `None` when timing was off at `start`.
    pub fn stop(self) -> Option<f64> {
        self.start.map(|s| s.elapsed().as_secs_f64())
    }

    /// Stop the timer and add the elapsed time to `acc`.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Running total and call count, safe to share between rayon workers.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Add one measured call of `duration_s` seconds.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Summed seconds over all recorded calls.
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean seconds per call, zero before the first record.
    pub fn average_seconds(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            n => self.total_seconds() / n as f64,
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Chemistry timers shared by the kinetics and integrator crates.
pub mod chemistry_timing {
    use super::AccumulatingTimer;

    /// Whole-cell `solve` calls
    pub static CELL_SOLVES: AccumulatingTimer = AccumulatingTimer::new();
    /// Jacobian assemblies
    pub static JACOBIANS: AccumulatingTimer = AccumulatingTimer::new();

    /// Reset all chemistry timers.
    pub fn reset_all() {
        CELL_SOLVES.reset();
        JACOBIANS.reset();
    }

    /// Log a timing summary at info level.
    pub fn log_summary() {
        if !super::is_enabled() {
            return;
        }
        for (label, timer) in [("cell solves", &CELL_SOLVES), ("jacobians", &JACOBIANS)] {
            if timer.count() > 0 {
                tracing::info!(
                    calls = timer.count(),
                    total_s = timer.total_seconds(),
                    avg_ms = timer.average_seconds() * 1000.0,
                    "{label}"
                );
            }
        }
    }
}
