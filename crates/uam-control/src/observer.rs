//! Run observer for progress reporting.

use uam_core::Step;

use crate::controller::{RunSummary, StepStats};

/// Callbacks invoked by [`StepController::run`][crate::StepController::run]
/// at tick boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl StepObserver for Progress {
///     fn on_step_end(&mut self, stats: &StepStats) {
///         if stats.step.is_multiple_of(600) {
///             println!("{}: {} vehicles live", stats.step, stats.live_vehicles);
///         }
///     }
/// }
/// ```
pub trait StepObserver {
    /// Called after the fleet has been seeded, before the first tick.
    fn on_run_start(&mut self, _hubs: usize, _taxis: usize) {}

    /// Called at the start of each tick, before the engine advances.
    fn on_step_start(&mut self, _step: Step) {}

    /// Called at the end of each tick with that tick's counters.
    fn on_step_end(&mut self, _stats: &StepStats) {}

    /// Called once after the loop terminates and the sinks are closed.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`StepObserver`] that does nothing.
pub struct NoopObserver;

impl StepObserver for NoopObserver {}
