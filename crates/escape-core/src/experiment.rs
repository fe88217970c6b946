//! Repeated independent trials and their aggregate statistics.
//!
//! [`run_experiment`] runs the same walk `trial_count` times, one after
//! another, drawing every step from the single random source it is given.
//! With a seeded source the whole experiment is reproducible bit for bit.
//!
//! Trials are stored under 1-based indices. The mean step count is only
//! computed once the last trial has finished; a failed trial aborts the
//! experiment and nothing is returned.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WalkError;
use crate::progress::ProgressObserver;
use crate::walk::{TrialResult, WalkParams, WalkSimulator};

/// Parameters for a full experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParams {
    /// Number of independent walks (at least 1).
    pub trial_count: u32,
    /// Parameters shared by every walk.
    pub walk: WalkParams,
}

impl ExperimentParams {
    /// Check the trial count and the walk parameters.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidParameter`] naming the bad parameter.
    pub fn validate(&self) -> Result<(), WalkError> {
        if self.trial_count == 0 {
            return Err(WalkError::invalid("trial_count", "must be at least 1"));
        }
        self.walk.validate()
    }
}

/// All trial results of one experiment plus derived statistics.
///
/// Built only by [`run_experiment`]; the mean is derived from the stored
/// trials and cannot be set independently of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentAggregate {
    trials: BTreeMap<u32, TrialResult>,
    mean_step_count: f64,
}

impl ExperimentAggregate {
    /// Freeze a completed set of trials and compute the mean step count.
    fn from_trials(trials: BTreeMap<u32, TrialResult>) -> Self {
        let mean_step_count = mean(trials.values().map(|t| t.step_count));
        Self {
            trials,
            mean_step_count,
        }
    }

    /// Arithmetic mean of the step counts over all trials.
    pub const fn mean_step_count(&self) -> f64 {
        self.mean_step_count
    }

    /// Number of trials stored.
    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    /// Trial results keyed by 1-based trial index.
    pub const fn trials(&self) -> &BTreeMap<u32, TrialResult> {
        &self.trials
    }

    /// The result of trial `index` (1-based).
    pub fn trial(&self, index: u32) -> Option<&TrialResult> {
        self.trials.get(&index)
    }

    /// The first trial, the one usually plotted.
    pub fn first_trial(&self) -> Option<&TrialResult> {
        self.trials.values().next()
    }

    /// Step counts in trial order.
    pub fn step_counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.trials.values().map(|t| t.step_count)
    }

    /// Fewest steps any trial needed.
    pub fn min_step_count(&self) -> Option<u64> {
        self.step_counts().min()
    }

    /// Most steps any trial needed.
    pub fn max_step_count(&self) -> Option<u64> {
        self.step_counts().max()
    }

    /// Sample standard deviation of the step counts (zero for a single trial).
    #[allow(clippy::cast_precision_loss)]
    pub fn step_count_std_dev(&self) -> f64 {
        let n = self.trials.len();
        if n < 2 {
            return 0.0;
        }
        let sum_sq: f64 = self
            .step_counts()
            .map(|s| {
                let d = s as f64 - self.mean_step_count;
                d * d
            })
            .sum();
        (sum_sq / (n.saturating_sub(1)) as f64).sqrt()
    }

    /// Standard error of the mean step count.
    #[allow(clippy::cast_precision_loss)]
    pub fn standard_error(&self) -> f64 {
        let n = self.trials.len();
        if n == 0 {
            return 0.0;
        }
        self.step_count_std_dev() / (n as f64).sqrt()
    }
}

/// Run `params.trial_count` independent walks and aggregate them.
///
/// The observer is told when each trial starts and finishes, and receives
/// the per-walk progress reports in between.
///
/// # Errors
///
/// Returns [`WalkError::InvalidParameter`] before any trial runs if a
/// parameter is out of range, or [`WalkError::DidNotConverge`] if a step
/// cap is set and a walk hits it.
pub fn run_experiment<R: Rng + ?Sized>(
    params: &ExperimentParams,
    rng: &mut R,
    observer: &mut dyn ProgressObserver,
) -> Result<ExperimentAggregate, WalkError> {
    params.validate()?;
    let simulator = WalkSimulator::new(&params.walk)?;

    debug!(
        trial_count = params.trial_count,
        dimension = params.walk.dimension,
        target_radius = simulator.target_radius(),
        "Experiment starting"
    );

    let mut trials = BTreeMap::new();
    for trial in 1..=params.trial_count {
        observer.on_trial_start(trial);
        let result = simulator.run(rng, observer)?;
        debug!(trial, step_count = result.step_count, "Trial complete");
        observer.on_trial_complete(trial, &result);
        trials.insert(trial, result);
    }

    let aggregate = ExperimentAggregate::from_trials(trials);
    debug!(
        mean_step_count = aggregate.mean_step_count(),
        "Experiment complete"
    );
    Ok(aggregate)
}

/// Arithmetic mean of a sequence of step counts; zero for an empty sequence.
#[allow(clippy::cast_precision_loss)]
fn mean(step_counts: impl Iterator<Item = u64>) -> f64 {
    let (sum, n) = step_counts.fold((0_u128, 0_u64), |(sum, n), s| {
        (sum.saturating_add(u128::from(s)), n.saturating_add(1))
    });
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}
