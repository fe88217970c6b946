//! Random-walk escape simulation for the Escape project.
//!
//! Estimates by Monte Carlo how many unit steps an isotropically
//! scattering particle needs to first get a given distance away from its
//! starting point, for comparison with the diffusion estimate
//! `N = (R / r)^2`.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `escape-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- [`WalkError`], the error type for every walk operation.
//! - [`experiment`] -- [`run_experiment`]: repeated independent trials and
//!   their aggregate statistics.
//! - [`physics`] -- [`EscapeGeometry`]: physical radius and mean free path,
//!   the diffusion estimate, and the photon escape time.
//! - [`progress`] -- [`ProgressObserver`] trait for following a run.
//! - [`rng`] -- Seeded and entropy-seeded random sources.
//! - [`sampler`] -- [`StepSampler`]: isotropic unit displacements.
//! - [`walk`] -- [`WalkSimulator`]: one walk from the origin to the radius.

pub mod config;
pub mod error;
pub mod experiment;
pub mod physics;
pub mod progress;
pub mod rng;
pub mod sampler;
pub mod walk;

// Re-export primary types at crate root.
pub use config::{ConfigError, EscapeConfig, ReportFormat};
pub use error::WalkError;
pub use experiment::{ExperimentAggregate, ExperimentParams, run_experiment};
pub use physics::{EscapeGeometry, relative_error_percent};
pub use progress::{NoOpObserver, ProgressObserver, WalkProgress};
pub use rng::{seeded_rng, walk_rng};
pub use sampler::{Displacement, StepSampler, euclidean_norm};
pub use walk::{TrialResult, Walk, WalkParams, WalkSimulator};
