//! Physical escape geometry and the diffusion estimate.
//!
//! A particle that scatters every `r` metres on average needs about
//! `N = (R / r)^2` steps to get a distance `R` away from where it started.
//! [`EscapeGeometry`] turns a physical radius and mean free path into the
//! walk's target radius (in step units), that estimate, and the time a
//! photon would need to cover `N` mean free paths.

use serde::{Deserialize, Serialize};

use crate::error::{WalkError, require_positive_finite};

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT_M_PER_S: f64 = 299_792_458.0;

/// Seconds in a Julian year (365.25 days).
pub const SECONDS_PER_JULIAN_YEAR: f64 = 31_557_600.0;

/// Escape radius and mean free path of the physical problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscapeGeometry {
    escape_radius_m: f64,
    mean_free_path_m: f64,
}

impl EscapeGeometry {
    /// Describe a region of radius `escape_radius_m` crossed in steps of
    /// `mean_free_path_m`.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidParameter`] if either length is not a
    /// positive finite number.
    pub fn new(escape_radius_m: f64, mean_free_path_m: f64) -> Result<Self, WalkError> {
        require_positive_finite("escape_radius_m", escape_radius_m)?;
        require_positive_finite("mean_free_path_m", mean_free_path_m)?;
        Ok(Self {
            escape_radius_m,
            mean_free_path_m,
        })
    }

    /// Escape radius in metres.
    pub const fn escape_radius_m(&self) -> f64 {
        self.escape_radius_m
    }

    /// Mean distance per step in metres.
    pub const fn mean_free_path_m(&self) -> f64 {
        self.mean_free_path_m
    }

    /// Escape radius in step units: the fewest steps that could reach it.
    pub fn radius_in_steps(&self) -> f64 {
        self.escape_radius_m / self.mean_free_path_m
    }

    /// Diffusion-theory estimate of the mean step count, `ceil((R / r)^2)`.
    pub fn expected_steps(&self) -> f64 {
        self.radius_in_steps().powi(2).ceil()
    }

    /// Years a photon needs to travel [`expected_steps`](Self::expected_steps)
    /// mean free paths at the speed of light.
    pub fn photon_escape_years(&self) -> f64 {
        self.expected_steps() * self.mean_free_path_m
            / (SPEED_OF_LIGHT_M_PER_S * SECONDS_PER_JULIAN_YEAR)
    }
}

/// Signed relative error of `observed` against `expected`, in percent.
///
/// Returns `None` when `expected` is zero.
pub fn relative_error_percent(observed: f64, expected: f64) -> Option<f64> {
    if expected == 0.0 {
        return None;
    }
    Some((observed - expected) * 100.0 / expected)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_problem_needs_a_hundred_steps() {
        let geometry = EscapeGeometry::new(5e-4, 5e-5).unwrap();
        assert_eq!(geometry.radius_in_steps(), 10.0);
        assert_eq!(geometry.expected_steps(), 100.0);
    }

    #[test]
    fn expected_steps_rounds_up() {
        let geometry = EscapeGeometry::new(2.5, 1.0).unwrap();
        assert_eq!(geometry.expected_steps(), 7.0);
    }

    #[test]
    fn photon_escape_time() {
        let geometry = EscapeGeometry::new(5e-4, 5e-5).unwrap();
        let years = geometry.photon_escape_years();
        let expected = 100.0 * 5e-5 / (299_792_458.0 * 31_557_600.0);
        assert!((years - expected).abs() <= expected * 1e-12);
        assert!((years - 5.285e-19).abs() < 1e-21);
    }

    #[test]
    fn lengths_must_be_positive() {
        assert!(matches!(
            EscapeGeometry::new(0.0, 1.0),
            Err(WalkError::InvalidParameter { name: "escape_radius_m", .. })
        ));
        assert!(matches!(
            EscapeGeometry::new(1.0, -1.0),
            Err(WalkError::InvalidParameter { name: "mean_free_path_m", .. })
        ));
    }

    #[test]
    fn relative_error_sign_follows_observation() {
        assert_eq!(relative_error_percent(110.0, 100.0), Some(10.0));
        assert_eq!(relative_error_percent(90.0, 100.0), Some(-10.0));
        assert_eq!(relative_error_percent(5.0, 0.0), None);
    }
}
