//! Unit-step sampling for the random walk.
//!
//! Each step is produced by drawing one value per axis uniformly from
//! `[-1, 1)` and scaling the resulting vector to length one. The direction
//! is only approximately uniform on the unit sphere (the corners of the
//! cube are over-represented), and that bias is kept on purpose: step
//! counts stay statistically comparable with earlier runs of the model.
//!
//! A zero-length draw cannot be normalized; it is discarded and redrawn.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::WalkError;

/// A single unit-length move in N-dimensional space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Displacement(Vec<f64>);

impl Displacement {
    /// Components of the displacement, one per axis.
    pub fn components(&self) -> &[f64] {
        &self.0
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Euclidean length (one, up to rounding).
    pub fn norm(&self) -> f64 {
        euclidean_norm(&self.0)
    }
}

/// Produces isotropic unit displacements for a fixed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSampler {
    dimension: usize,
}

impl StepSampler {
    /// Create a sampler for `dimension`-dimensional steps.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidParameter`] if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self, WalkError> {
        if dimension == 0 {
            return Err(WalkError::invalid("dimension", "must be at least 1"));
        }
        Ok(Self { dimension })
    }

    /// The dimension this sampler produces steps in.
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Draw one unit displacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Displacement {
        let mut components = vec![0.0; self.dimension];
        fill_unit(rng, &mut components);
        Displacement(components)
    }

    /// Draw one unit displacement into `out`, reusing its storage.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidParameter`] if `out` does not hold exactly
    /// [`dimension`](Self::dimension) elements; nothing is drawn in that case.
    pub fn sample_into<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        out: &mut [f64],
    ) -> Result<(), WalkError> {
        if out.len() != self.dimension {
            return Err(WalkError::invalid(
                "out",
                format!(
                    "buffer holds {} elements, expected {}",
                    out.len(),
                    self.dimension
                ),
            ));
        }
        fill_unit(rng, out);
        Ok(())
    }
}

/// Overwrite the non-empty `components` with a unit vector.
fn fill_unit<R: Rng + ?Sized>(rng: &mut R, components: &mut [f64]) {
    loop {
        for c in components.iter_mut() {
            *c = rng.random::<f64>().mul_add(2.0, -1.0);
        }
        let length = euclidean_norm(components);
        if length > 0.0 {
            for c in components.iter_mut() {
                *c /= length;
            }
            return;
        }
        // Degenerate all-zero draw: redraw every axis.
    }
}

/// Euclidean length of a vector.
pub fn euclidean_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use rand::rngs::{SmallRng, StdRng};
    use rand::{RngCore, SeedableRng};

    use super::*;

    /// Yields `1 << 63` (which maps to `0.5`, i.e. a zero component) for
    /// the first `zeros` draws, then a spread of ordinary values.
    struct ZeroThen {
        zeros: u64,
        calls: u64,
    }

    impl RngCore for ZeroThen {
        fn next_u32(&mut self) -> u32 {
            u32::try_from(self.next_u64() >> 32).unwrap()
        }

        fn next_u64(&mut self) -> u64 {
            self.calls += 1;
            if self.calls <= self.zeros {
                1 << 63
            } else {
                self.calls.wrapping_mul(0x9e37_79b9_7f4a_7c15)
            }
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for chunk in dst.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }
    }

    #[test]
    fn all_zero_draw_is_redrawn() {
        let sampler = StepSampler::new(3).unwrap();
        let mut rng = ZeroThen { zeros: 3, calls: 0 };
        let step = sampler.sample(&mut rng);
        assert!((step.norm() - 1.0).abs() < 1e-9);
        assert_eq!(rng.calls, 6);
    }

    #[test]
    fn repeated_zero_draws_are_all_redrawn() {
        let sampler = StepSampler::new(2).unwrap();
        let mut rng = ZeroThen { zeros: 6, calls: 0 };
        let mut buf = [0.0; 2];
        sampler.sample_into(&mut rng, &mut buf).unwrap();
        assert!((euclidean_norm(&buf) - 1.0).abs() < 1e-9);
        assert_eq!(rng.calls, 8);
    }

    #[test]
    fn empty_buffer_is_rejected_without_drawing() {
        let sampler = StepSampler::new(3).unwrap();
        let mut rng = ZeroThen { zeros: 0, calls: 0 };
        let err = sampler.sample_into(&mut rng, &mut []);
        assert!(matches!(
            err,
            Err(WalkError::InvalidParameter { name: "out", .. })
        ));
        assert_eq!(rng.calls, 0);
    }

    #[test]
    fn wrong_sized_buffer_is_rejected() {
        let sampler = StepSampler::new(3).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut buf = [0.0; 4];
        assert!(sampler.sample_into(&mut rng, &mut buf).is_err());
        assert_eq!(buf, [0.0; 4]);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let err = StepSampler::new(0);
        assert!(matches!(
            err,
            Err(WalkError::InvalidParameter { name: "dimension", .. })
        ));
    }

    #[test]
    fn steps_have_unit_length_in_every_dimension() {
        let mut rng = SmallRng::seed_from_u64(7);
        for dimension in 1..=8 {
            let sampler = StepSampler::new(dimension).unwrap();
            for _ in 0..1_000 {
                let step = sampler.sample(&mut rng);
                assert_eq!(step.dimension(), dimension);
                assert!((step.norm() - 1.0).abs() < 1e-9, "norm {}", step.norm());
            }
        }
    }

    #[test]
    fn one_dimensional_steps_are_plus_or_minus_one() {
        let mut rng = SmallRng::seed_from_u64(3);
        let sampler = StepSampler::new(1).unwrap();
        let mut seen_positive = false;
        let mut seen_negative = false;
        for _ in 0..200 {
            let step = sampler.sample(&mut rng);
            let x = step.components().first().copied().unwrap();
            assert_eq!(x.abs(), 1.0);
            seen_positive |= x > 0.0;
            seen_negative |= x < 0.0;
        }
        assert!(seen_positive && seen_negative);
    }

    #[test]
    fn same_seed_gives_same_steps() {
        let sampler = StepSampler::new(3).unwrap();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(sampler.sample(&mut a), sampler.sample(&mut b));
        }
    }

    #[test]
    fn sample_into_matches_sample() {
        let sampler = StepSampler::new(4).unwrap();
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let mut buf = [0.0; 4];
        sampler.sample_into(&mut a, &mut buf).unwrap();
        assert_eq!(sampler.sample(&mut b).components(), &buf);
    }

    #[test]
    fn components_stay_within_unit_box() {
        let mut rng = SmallRng::seed_from_u64(99);
        let sampler = StepSampler::new(3).unwrap();
        for _ in 0..500 {
            let step = sampler.sample(&mut rng);
            assert!(step.components().iter().all(|c| c.abs() <= 1.0));
        }
    }

    #[test]
    fn norm_of_known_vector() {
        assert_eq!(euclidean_norm(&[3.0, 4.0]), 5.0);
        assert_eq!(euclidean_norm(&[]), 0.0);
    }
}
