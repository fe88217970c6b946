//! Error types for the `escape-core` crate.
//!
//! All fallible sampling, walk, and experiment operations return
//! [`WalkError`]. Parameter problems are reported before any random
//! numbers are drawn, so a rejected run never leaves partial results.

/// Errors that can occur while setting up or running a random walk.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalkError {
    /// A numeric parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Explanation of what is wrong with the value.
        reason: String,
    },

    /// The walk hit its configured step cap before crossing the target radius.
    #[error(
        "walk did not reach radius {target_radius} within {max_steps} steps (final radius {final_radius})"
    )]
    DidNotConverge {
        /// The configured step cap.
        max_steps: u64,
        /// The radius the walk was trying to reach, in step units.
        target_radius: f64,
        /// Distance from the origin when the cap was hit.
        final_radius: f64,
    },
}

impl WalkError {
    /// Build an [`WalkError::InvalidParameter`] for the named parameter.
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Require `value` to be a finite number strictly greater than zero.
pub(crate) fn require_positive_finite(name: &'static str, value: f64) -> Result<(), WalkError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(WalkError::invalid(
            name,
            format!("must be a positive finite number, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_finite_accepts_positive() {
        assert!(require_positive_finite("radius", 0.5).is_ok());
    }

    #[test]
    fn positive_finite_rejects_zero_negative_and_nan() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = require_positive_finite("radius", value);
            assert!(
                matches!(err, Err(WalkError::InvalidParameter { name: "radius", .. })),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_parameter_message_names_parameter() {
        let err = WalkError::invalid("dimension", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid parameter `dimension`: must be at least 1"
        );
    }
}
