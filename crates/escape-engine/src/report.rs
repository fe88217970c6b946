//! Run reporting: progress logging and the final summary.
//!
//! [`LoggingObserver`] forwards the simulator's progress notifications to
//! `tracing`. After the run, [`RunSummary`] collects what the user sees:
//! the diffusion estimate, the measured mean, their relative error, and
//! where the first trial left the region.

use std::time::Duration;

use escape_core::{
    EscapeGeometry, ExperimentAggregate, ProgressObserver, TrialResult, WalkProgress,
    relative_error_percent,
};
use serde::Serialize;
use tracing::info;

/// Logs walk progress and trial boundaries.
#[derive(Debug, Default)]
pub struct LoggingObserver {
    current_trial: u32,
}

impl ProgressObserver for LoggingObserver {
    fn on_walk_progress(&mut self, progress: WalkProgress) {
        info!(
            trial = self.current_trial,
            step = progress.step,
            radius = progress.radius,
            "Walk progress"
        );
    }

    fn on_trial_start(&mut self, trial: u32) {
        self.current_trial = trial;
        info!(trial, "Trial starting");
    }

    fn on_trial_complete(&mut self, trial: u32, result: &TrialResult) {
        info!(
            trial,
            step_count = result.step_count,
            final_radius = result.final_radius(),
            "Trial complete"
        );
    }
}

/// Everything reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Number of spatial dimensions walked in.
    pub dimension: usize,
    /// Escape radius in metres.
    pub escape_radius_m: f64,
    /// Mean free path in metres.
    pub mean_free_path_m: f64,
    /// Escape radius in step units.
    pub radius_in_steps: f64,
    /// Diffusion estimate of the mean step count.
    pub expected_steps: f64,
    /// Years a photon would need for the estimated number of steps.
    pub photon_escape_years: f64,
    /// Number of trials run.
    pub trials: usize,
    /// Measured mean step count.
    pub mean_steps: f64,
    /// Standard error of the measured mean.
    pub standard_error: f64,
    /// Fewest steps in any trial.
    pub min_steps: Option<u64>,
    /// Most steps in any trial.
    pub max_steps: Option<u64>,
    /// Signed relative error of the mean against the estimate, in percent.
    pub relative_error_percent: Option<f64>,
    /// First trial's exit point (the origin is always the zero vector).
    pub first_exit_point: Option<Vec<f64>>,
    /// Wall-clock run time in seconds.
    pub elapsed_seconds: f64,
}

impl RunSummary {
    /// Collect the summary of a finished experiment.
    pub fn new(
        geometry: &EscapeGeometry,
        dimension: usize,
        aggregate: &ExperimentAggregate,
        elapsed: Duration,
    ) -> Self {
        let expected_steps = geometry.expected_steps();
        Self {
            dimension,
            escape_radius_m: geometry.escape_radius_m(),
            mean_free_path_m: geometry.mean_free_path_m(),
            radius_in_steps: geometry.radius_in_steps(),
            expected_steps,
            photon_escape_years: geometry.photon_escape_years(),
            trials: aggregate.trial_count(),
            mean_steps: aggregate.mean_step_count(),
            standard_error: aggregate.standard_error(),
            min_steps: aggregate.min_step_count(),
            max_steps: aggregate.max_step_count(),
            relative_error_percent: relative_error_percent(
                aggregate.mean_step_count(),
                expected_steps,
            ),
            first_exit_point: aggregate
                .first_trial()
                .and_then(|t| t.walk.last_position())
                .map(<[f64]>::to_vec),
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }

    /// Log the summary as structured `tracing` events.
    pub fn log(&self) {
        info!(
            trials = self.trials,
            mean_steps = format_args!("{:e}", self.mean_steps),
            standard_error = self.standard_error,
            min_steps = self.min_steps,
            max_steps = self.max_steps,
            "Mean step count"
        );
        if let Some(error) = self.relative_error_percent {
            info!(
                expected_steps = format_args!("{:e}", self.expected_steps),
                mean_steps = format_args!("{:e}", self.mean_steps),
                relative_error_percent = format_args!("{error:.2}"),
                "Relative error against diffusion estimate"
            );
        }
        if let Some(exit) = &self.first_exit_point {
            info!(
                origin = ?vec![0.0_f64; self.dimension],
                exit_point = ?exit,
                "First trial path"
            );
        }
        info!(
            elapsed_seconds = format_args!("{:e}", self.elapsed_seconds),
            "Run finished"
        );
    }
}

/// Log the diffusion estimate before any trial runs.
pub fn log_estimate(geometry: &EscapeGeometry) {
    info!(
        expected_steps = format_args!("{:e}", geometry.expected_steps()),
        escape_radius_m = format_args!("{:e}", geometry.escape_radius_m()),
        mean_free_path_m = format_args!("{:e}", geometry.mean_free_path_m()),
        "Estimated mean step count"
    );
    info!(
        photon_escape_years = format_args!("{:e}", geometry.photon_escape_years()),
        "Estimated photon escape time"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use escape_core::{ExperimentParams, NoOpObserver, WalkParams, run_experiment, seeded_rng};

    use super::*;

    fn small_run() -> (EscapeGeometry, ExperimentAggregate) {
        let geometry = EscapeGeometry::new(3.0, 1.0).unwrap();
        let params = ExperimentParams {
            trial_count: 4,
            walk: WalkParams {
                dimension: 3,
                target_radius: geometry.radius_in_steps(),
                progress_interval: 5,
                max_steps: None,
            },
        };
        let aggregate = run_experiment(&params, &mut seeded_rng(12), &mut NoOpObserver).unwrap();
        (geometry, aggregate)
    }

    #[test]
    fn summary_reflects_aggregate() {
        let (geometry, aggregate) = small_run();
        let summary = RunSummary::new(&geometry, 3, &aggregate, Duration::from_millis(1500));
        assert_eq!(summary.trials, 4);
        assert_eq!(summary.expected_steps, 9.0);
        assert_eq!(summary.mean_steps, aggregate.mean_step_count());
        assert_eq!(summary.elapsed_seconds, 1.5);
        assert_eq!(summary.first_exit_point.as_ref().map(Vec::len), Some(3));
        let expected_error = (summary.mean_steps - 9.0) * 100.0 / 9.0;
        assert_eq!(summary.relative_error_percent, Some(expected_error));
    }

    #[test]
    fn summary_serializes_to_json() {
        let (geometry, aggregate) = small_run();
        let summary = RunSummary::new(&geometry, 3, &aggregate, Duration::ZERO);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["trials"], 4);
        assert_eq!(json["radius_in_steps"], 3.0);
        assert!(json["first_exit_point"].is_array());
    }

    #[test]
    fn logging_observer_tracks_current_trial() {
        let mut observer = LoggingObserver::default();
        observer.on_trial_start(2);
        observer.on_walk_progress(WalkProgress {
            step: 10,
            radius: 2.5,
        });
        assert_eq!(observer.current_trial, 2);
    }
}
