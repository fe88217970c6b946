//! A single random walk from the origin to the escape radius.
//!
//! [`WalkSimulator::run`] starts at the origin, applies one unit step at a
//! time, and stops the first time the newest position lies at or beyond
//! the target radius. The radius is only checked after a step has been
//! appended, never before, so the final position is always the first one
//! outside the target sphere.
//!
//! The loop has no built-in bound. It terminates almost surely, but a very
//! large target radius can keep it busy for a long time; set
//! [`WalkParams::max_steps`] to turn that into a
//! [`WalkError::DidNotConverge`] instead.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{WalkError, require_positive_finite};
use crate::progress::{ProgressObserver, WalkProgress};
use crate::sampler::{StepSampler, euclidean_norm};

/// The ordered positions visited by one walk, starting at the origin.
///
/// Positions are stored back to back in one flat buffer of
/// `dimension * len()` coordinates. A walk always holds at least the
/// origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walk {
    dimension: usize,
    coords: Vec<f64>,
}

impl Walk {
    /// A walk that has not moved yet: only the origin.
    fn at_origin(dimension: usize) -> Self {
        Self {
            dimension,
            coords: vec![0.0; dimension],
        }
    }

    /// Number of axes per position.
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of positions, including the origin.
    pub fn len(&self) -> usize {
        self.coords.len().checked_div(self.dimension).unwrap_or(0)
    }

    /// Whether the walk holds no positions (never true for a simulated walk).
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Number of steps applied, i.e. `len() - 1`.
    pub fn step_count(&self) -> u64 {
        u64::try_from(self.len().saturating_sub(1)).unwrap_or(u64::MAX)
    }

    /// Iterate over positions in visiting order.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.coords.chunks_exact(self.dimension.max(1))
    }

    /// The position at `index` (0 is the origin).
    pub fn position(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.coords.get(start..end)
    }

    /// The starting point.
    pub fn origin(&self) -> Option<&[f64]> {
        self.position(0)
    }

    /// The last position visited; for a finished walk, the exit point.
    pub fn last_position(&self) -> Option<&[f64]> {
        self.positions().last()
    }

    /// Distance from the origin of every position, in visiting order.
    pub fn radial_distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.positions().map(euclidean_norm)
    }

    /// Append `last position + step` and return the new distance from the origin.
    fn push_step(&mut self, step: &[f64]) -> f64 {
        let end = self.coords.len();
        let start = end.saturating_sub(self.dimension);
        self.coords.extend_from_within(start..end);
        let (_, newest) = self.coords.split_at_mut(end);
        for (c, d) in newest.iter_mut().zip(step) {
            *c += d;
        }
        euclidean_norm(newest)
    }
}

/// One completed walk together with its step count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Every position visited, origin first.
    pub walk: Walk,
    /// Number of unit steps taken; always `walk.len() - 1`.
    pub step_count: u64,
}

impl TrialResult {
    /// Distance of the exit point from the origin.
    pub fn final_radius(&self) -> f64 {
        self.walk.last_position().map_or(0.0, euclidean_norm)
    }
}

/// Parameters for a single walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkParams {
    /// Number of spatial dimensions (at least 1).
    pub dimension: usize,
    /// Escape radius measured in step lengths (positive, finite).
    pub target_radius: f64,
    /// Emit a progress observation every this many steps (at least 1).
    pub progress_interval: u64,
    /// Optional safety cap on steps per walk; `None` means unbounded.
    pub max_steps: Option<u64>,
}

impl WalkParams {
    /// Check every parameter, reporting the first one that is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidParameter`] naming the bad parameter.
    pub fn validate(&self) -> Result<(), WalkError> {
        if self.dimension == 0 {
            return Err(WalkError::invalid("dimension", "must be at least 1"));
        }
        require_positive_finite("target_radius", self.target_radius)?;
        if self.progress_interval == 0 {
            return Err(WalkError::invalid("progress_interval", "must be at least 1"));
        }
        if self.max_steps == Some(0) {
            return Err(WalkError::invalid("max_steps", "must be at least 1 when set"));
        }
        Ok(())
    }
}

/// Runs walks with a fixed dimension and escape radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkSimulator {
    sampler: StepSampler,
    target_radius: f64,
    progress_interval: u64,
    max_steps: Option<u64>,
}

impl WalkSimulator {
    /// Validate `params` and build a simulator for them.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidParameter`] if any parameter is out of range.
    pub fn new(params: &WalkParams) -> Result<Self, WalkError> {
        params.validate()?;
        Ok(Self {
            sampler: StepSampler::new(params.dimension)?,
            target_radius: params.target_radius,
            progress_interval: params.progress_interval,
            max_steps: params.max_steps,
        })
    }

    /// The escape radius in step units.
    pub const fn target_radius(&self) -> f64 {
        self.target_radius
    }

    /// The dimension walks are simulated in.
    pub const fn dimension(&self) -> usize {
        self.sampler.dimension()
    }

    /// Walk from the origin until the radius is reached.
    ///
    /// Every `progress_interval` steps the observer receives the step
    /// count and current distance from the origin.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::DidNotConverge`] only when a step cap is set and
    /// reached before the walk escapes.
    pub fn run<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        observer: &mut dyn ProgressObserver,
    ) -> Result<TrialResult, WalkError> {
        let mut walk = Walk::at_origin(self.dimension());
        let mut step = vec![0.0; self.dimension()];
        let mut step_count: u64 = 0;

        loop {
            self.sampler.sample_into(rng, &mut step)?;
            let radius = walk.push_step(&step);
            step_count = step_count.saturating_add(1);

            if step_count.is_multiple_of(self.progress_interval) {
                observer.on_walk_progress(WalkProgress {
                    step: step_count,
                    radius,
                });
            }

            if radius >= self.target_radius {
                trace!(step_count, radius, "walk escaped");
                return Ok(TrialResult { walk, step_count });
            }

            if let Some(max_steps) = self.max_steps.filter(|cap| step_count >= *cap) {
                return Err(WalkError::DidNotConverge {
                    max_steps,
                    target_radius: self.target_radius,
                    final_radius: radius,
                });
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::progress::NoOpObserver;

    fn params(dimension: usize, target_radius: f64) -> WalkParams {
        WalkParams {
            dimension,
            target_radius,
            progress_interval: 1_000_000,
            max_steps: None,
        }
    }

    #[derive(Default)]
    struct Recorder {
        reports: Vec<WalkProgress>,
    }

    impl ProgressObserver for Recorder {
        fn on_walk_progress(&mut self, progress: WalkProgress) {
            self.reports.push(progress);
        }
    }

    #[test]
    fn completed_walk_satisfies_escape_invariants() {
        let sim = WalkSimulator::new(&params(3, 12.5)).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..20 {
            let result = sim.run(&mut rng, &mut NoOpObserver).unwrap();
            let walk = &result.walk;

            assert_eq!(walk.len(), usize::try_from(result.step_count).unwrap() + 1);
            assert_eq!(walk.step_count(), result.step_count);
            assert_eq!(walk.origin().unwrap(), &[0.0, 0.0, 0.0]);

            let radii: Vec<f64> = walk.radial_distances().collect();
            let last = radii[radii.len() - 1];
            assert!(last >= 12.5);
            assert!(radii[..radii.len() - 1].iter().all(|r| *r < 12.5));
            assert_eq!(result.final_radius(), last);
        }
    }

    #[test]
    fn consecutive_positions_are_one_step_apart() {
        let sim = WalkSimulator::new(&params(2, 8.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let result = sim.run(&mut rng, &mut NoOpObserver).unwrap();
        let positions: Vec<&[f64]> = result.walk.positions().collect();
        for pair in positions.windows(2) {
            let delta: Vec<f64> = pair[1].iter().zip(pair[0]).map(|(b, a)| b - a).collect();
            assert!((euclidean_norm(&delta) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn unit_radius_in_one_dimension_takes_exactly_one_step() {
        let sim = WalkSimulator::new(&params(1, 1.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let result = sim.run(&mut rng, &mut NoOpObserver).unwrap();
            assert_eq!(result.step_count, 1);
            assert_eq!(result.walk.len(), 2);
            assert_eq!(result.final_radius(), 1.0);
        }
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        for radius in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = WalkSimulator::new(&params(3, radius));
            assert!(matches!(
                err,
                Err(WalkError::InvalidParameter { name: "target_radius", .. })
            ));
        }
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let err = WalkSimulator::new(&params(0, 5.0));
        assert!(matches!(
            err,
            Err(WalkError::InvalidParameter { name: "dimension", .. })
        ));
    }

    #[test]
    fn zero_progress_interval_is_rejected() {
        let mut p = params(3, 5.0);
        p.progress_interval = 0;
        assert!(matches!(
            WalkSimulator::new(&p),
            Err(WalkError::InvalidParameter { name: "progress_interval", .. })
        ));
    }

    #[test]
    fn zero_step_cap_is_rejected() {
        let mut p = params(3, 5.0);
        p.max_steps = Some(0);
        assert!(matches!(
            WalkSimulator::new(&p),
            Err(WalkError::InvalidParameter { name: "max_steps", .. })
        ));
    }

    #[test]
    fn progress_is_reported_on_every_interval() {
        let mut p = params(3, 15.0);
        p.progress_interval = 10;
        let sim = WalkSimulator::new(&p).unwrap();
        let mut rng = StdRng::seed_from_u64(77);
        let mut recorder = Recorder::default();
        let result = sim.run(&mut rng, &mut recorder).unwrap();

        assert_eq!(
            u64::try_from(recorder.reports.len()).unwrap(),
            result.step_count / 10
        );
        let radii: Vec<f64> = result.walk.radial_distances().collect();
        for report in &recorder.reports {
            assert_eq!(report.step % 10, 0);
            assert_eq!(report.radius, radii[usize::try_from(report.step).unwrap()]);
        }
    }

    #[test]
    fn step_cap_reports_non_convergence() {
        let mut p = params(3, 1_000.0);
        p.max_steps = Some(25);
        let sim = WalkSimulator::new(&p).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = sim.run(&mut rng, &mut NoOpObserver).unwrap_err();
        match err {
            WalkError::DidNotConverge {
                max_steps,
                target_radius,
                final_radius,
            } => {
                assert_eq!(max_steps, 25);
                assert_eq!(target_radius, 1_000.0);
                assert!(final_radius <= 25.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn same_seed_reproduces_walk() {
        let sim = WalkSimulator::new(&params(3, 6.0)).unwrap();
        let a = sim
            .run(&mut StdRng::seed_from_u64(9), &mut NoOpObserver)
            .unwrap();
        let b = sim
            .run(&mut StdRng::seed_from_u64(9), &mut NoOpObserver)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn push_step_appends_sum_of_last_position_and_step() {
        let mut walk = Walk::at_origin(2);
        assert!((walk.push_step(&[0.6, 0.8]) - 1.0).abs() < 1e-12);
        let radius = walk.push_step(&[0.6, 0.8]);
        assert!((radius - 2.0).abs() < 1e-12);
        assert_eq!(walk.len(), 3);
        assert_eq!(walk.position(1).unwrap(), &[0.6, 0.8]);
        assert_eq!(walk.origin().unwrap(), &[0.0, 0.0]);
        assert_eq!(walk.radial_distances().last(), Some(radius));
    }

    #[test]
    fn simulator_keeps_configured_radius() {
        let sim = WalkSimulator::new(&params(3, 4.5)).unwrap();
        assert_eq!(sim.target_radius(), 4.5);
        let result = sim
            .run(&mut StdRng::seed_from_u64(21), &mut NoOpObserver)
            .unwrap();
        assert!(result.final_radius() >= sim.target_radius());
    }

    #[test]
    fn position_lookup_out_of_range_is_none() {
        let sim = WalkSimulator::new(&params(2, 2.0)).unwrap();
        let result = sim
            .run(&mut StdRng::seed_from_u64(4), &mut NoOpObserver)
            .unwrap();
        assert!(result.walk.position(result.walk.len()).is_none());
        assert_eq!(result.walk.last_position(), result.walk.position(result.walk.len() - 1));
    }
}
