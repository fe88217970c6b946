//! Observation hooks for long-running walks and experiments.
//!
//! The simulator itself never prints. Anything that wants to follow a run
//! (console output, structured logs, a plot) implements [`ProgressObserver`]
//! and is handed to [`WalkSimulator::run`] or [`run_experiment`].
//!
//! [`WalkSimulator::run`]: crate::walk::WalkSimulator::run
//! [`run_experiment`]: crate::experiment::run_experiment

use crate::walk::TrialResult;

/// Periodic progress report emitted while a walk is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkProgress {
    /// Number of steps taken so far.
    pub step: u64,
    /// Distance of the newest position from the origin, in step units.
    pub radius: f64,
}

/// Receives progress notifications from the simulator.
///
/// Every method has an empty default so implementations only override
/// the events they care about.
pub trait ProgressObserver {
    /// Called whenever the step counter is a multiple of the progress interval.
    fn on_walk_progress(&mut self, _progress: WalkProgress) {}

    /// Called before trial `trial` (1-based) starts.
    fn on_trial_start(&mut self, _trial: u32) {}

    /// Called after trial `trial` (1-based) has crossed the target radius.
    fn on_trial_complete(&mut self, _trial: u32, _result: &TrialResult) {}
}

/// An observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl ProgressObserver for NoOpObserver {}
