//! Integration tests for the walk and experiment pipeline.
//!
//! These run whole experiments through the public API and check the
//! properties that only show up across many steps or many trials:
//! reproducibility from a seed and convergence towards `R^2` steps.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]

use escape_core::{
    ExperimentParams, NoOpObserver, WalkError, WalkParams, euclidean_norm, run_experiment,
    seeded_rng,
};

fn params(trial_count: u32, dimension: usize, target_radius: f64) -> ExperimentParams {
    ExperimentParams {
        trial_count,
        walk: WalkParams {
            dimension,
            target_radius,
            progress_interval: 1_000_000,
            max_steps: None,
        },
    }
}

#[test]
fn seeded_plane_experiment_is_reproducible() {
    let p = params(100, 2, 50.0);
    let first = run_experiment(&p, &mut seeded_rng(9_472_749), &mut NoOpObserver).unwrap();
    let second = run_experiment(&p, &mut seeded_rng(9_472_749), &mut NoOpObserver).unwrap();

    let a: Vec<u64> = first.step_counts().collect();
    let b: Vec<u64> = second.step_counts().collect();
    assert_eq!(a.len(), 100);
    assert_eq!(a, b);
    assert_eq!(first, second);
    assert!(a.iter().all(|s| *s >= 50));
}

#[test]
fn different_seeds_give_different_experiments() {
    let p = params(20, 3, 10.0);
    let first = run_experiment(&p, &mut seeded_rng(1), &mut NoOpObserver).unwrap();
    let second = run_experiment(&p, &mut seeded_rng(2), &mut NoOpObserver).unwrap();
    assert_ne!(first, second);
}

#[test]
fn three_dimensional_mean_approaches_radius_squared() {
    // |X_n|^2 - n is a martingale for unit steps with zero mean, so the
    // expected step count lies in [R^2, (R + 1)^2).
    let radius = 20.0;
    let agg = run_experiment(&params(2_000, 3, radius), &mut seeded_rng(31_415), &mut NoOpObserver)
        .unwrap();
    let expected = radius * radius;
    let relative = (agg.mean_step_count() - expected).abs() / expected;
    assert!(
        relative < 0.15,
        "mean {} too far from {expected}",
        agg.mean_step_count()
    );
    assert!(agg.standard_error() > 0.0);
    assert!(agg.standard_error() < agg.step_count_std_dev());
}

#[test]
fn every_trial_satisfies_walk_invariants() {
    let agg = run_experiment(&params(25, 3, 7.5), &mut seeded_rng(8), &mut NoOpObserver).unwrap();
    for trial in agg.trials().values() {
        let radii: Vec<f64> = trial.walk.radial_distances().collect();
        assert_eq!(radii.len() as u64, trial.step_count + 1);
        let (last, earlier) = radii.split_last().unwrap();
        assert!(*last >= 7.5);
        assert!(earlier.iter().all(|r| *r < 7.5));

        let positions: Vec<&[f64]> = trial.walk.positions().collect();
        for pair in positions.windows(2) {
            if let [from, to] = pair {
                let delta: Vec<f64> = to.iter().zip(from.iter()).map(|(b, a)| b - a).collect();
                assert!((euclidean_norm(&delta) - 1.0).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn line_walk_to_unit_radius_always_takes_one_step() {
    let agg = run_experiment(&params(5, 1, 1.0), &mut seeded_rng(0), &mut NoOpObserver).unwrap();
    assert!(agg.step_counts().all(|s| s == 1));
    assert_eq!(agg.mean_step_count(), 1.0);
}

#[test]
fn zero_radius_in_three_dimensions_is_rejected() {
    let err = run_experiment(&params(5, 3, 0.0), &mut seeded_rng(0), &mut NoOpObserver);
    assert!(matches!(
        err,
        Err(WalkError::InvalidParameter { name: "target_radius", .. })
    ));
}
