//! Configuration loading and typed config structures for the Escape simulation.
//!
//! The canonical configuration lives in `escape-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every field has a
//! default, so an empty document (or a missing file) describes the
//! reference problem: a 0.5 mm region crossed in 0.05 mm steps in three
//! dimensions.

use std::path::Path;

use serde::Deserialize;

use crate::error::WalkError;
use crate::experiment::ExperimentParams;
use crate::physics::EscapeGeometry;
use crate::walk::WalkParams;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `escape-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EscapeConfig {
    /// Physical size of the region and of one step.
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// Walk and trial parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Result report configuration.
    #[serde(default)]
    pub report: ReportConfig,
}

impl EscapeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Build the escape geometry described by the `physics` section.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidParameter`] if a length is not positive.
    pub fn geometry(&self) -> Result<EscapeGeometry, WalkError> {
        EscapeGeometry::new(self.physics.escape_radius_m, self.physics.mean_free_path_m)
    }

    /// Experiment parameters, with the target radius taken from the geometry.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidParameter`] if any derived parameter is
    /// out of range.
    pub fn experiment_params(&self) -> Result<ExperimentParams, WalkError> {
        let geometry = self.geometry()?;
        let params = ExperimentParams {
            trial_count: self.simulation.trials,
            walk: WalkParams {
                dimension: self.simulation.dimension,
                target_radius: geometry.radius_in_steps(),
                progress_interval: self.simulation.progress_interval,
                max_steps: self.simulation.max_steps,
            },
        };
        params.validate()?;
        Ok(params)
    }
}

/// Physical lengths of the escape problem.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PhysicsConfig {
    /// Radius of the region the particle must leave, in metres.
    #[serde(default = "default_escape_radius_m")]
    pub escape_radius_m: f64,

    /// Mean distance travelled per step, in metres.
    #[serde(default = "default_mean_free_path_m")]
    pub mean_free_path_m: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            escape_radius_m: default_escape_radius_m(),
            mean_free_path_m: default_mean_free_path_m(),
        }
    }
}

/// Walk and trial parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Number of spatial dimensions.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Number of independent trials to average.
    #[serde(default = "default_trials")]
    pub trials: u32,

    /// Report walk progress every this many steps.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Seed for reproducible runs; absent means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Optional cap on steps per walk; absent means unbounded.
    #[serde(default)]
    pub max_steps: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            trials: default_trials(),
            progress_interval: default_progress_interval(),
            seed: None,
            max_steps: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// How the final results are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Human-readable log lines.
    #[default]
    Text,
    /// A single JSON summary object on stdout.
    Json,
}

/// Result report configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ReportConfig {
    /// Output format of the final report.
    #[serde(default)]
    pub format: ReportFormat,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_escape_radius_m() -> f64 {
    5e-4
}

const fn default_mean_free_path_m() -> f64 {
    5e-5
}

const fn default_dimension() -> usize {
    3
}

const fn default_trials() -> u32 {
    3
}

const fn default_progress_interval() -> u64 {
    1_000_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_describes_reference_problem() {
        let config = EscapeConfig::default();
        assert_eq!(config.physics.escape_radius_m, 5e-4);
        assert_eq!(config.physics.mean_free_path_m, 5e-5);
        assert_eq!(config.simulation.dimension, 3);
        assert_eq!(config.simulation.trials, 3);
        assert_eq!(config.simulation.progress_interval, 1_000_000);
        assert_eq!(config.simulation.seed, None);
        assert_eq!(config.simulation.max_steps, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.report.format, ReportFormat::Text);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
physics:
  escape_radius_m: 1.0e-3
  mean_free_path_m: 1.0e-4

simulation:
  dimension: 2
  trials: 250
  progress_interval: 500
  seed: 9472749
  max_steps: 1000000

logging:
  level: "debug"
  json: true

report:
  format: json
"#;
        let config = EscapeConfig::parse(yaml).unwrap();
        assert_eq!(config.physics.escape_radius_m, 1.0e-3);
        assert_eq!(config.simulation.dimension, 2);
        assert_eq!(config.simulation.trials, 250);
        assert_eq!(config.simulation.progress_interval, 500);
        assert_eq!(config.simulation.seed, Some(9_472_749));
        assert_eq!(config.simulation.max_steps, Some(1_000_000));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = EscapeConfig::parse("simulation:\n  trials: 7\n").unwrap();
        assert_eq!(config.simulation.trials, 7);
        assert_eq!(config.simulation.dimension, 3);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(EscapeConfig::parse("").unwrap(), EscapeConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = EscapeConfig::parse("simulation: [unclosed");
        assert!(matches!(err, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn experiment_params_use_radius_in_steps() {
        let params = EscapeConfig::default().experiment_params().unwrap();
        assert_eq!(params.trial_count, 3);
        assert_eq!(params.walk.dimension, 3);
        assert_eq!(params.walk.target_radius, 10.0);
        assert_eq!(params.walk.progress_interval, 1_000_000);
    }

    #[test]
    fn experiment_params_reject_zero_trials() {
        let mut config = EscapeConfig::default();
        config.simulation.trials = 0;
        assert!(matches!(
            config.experiment_params(),
            Err(WalkError::InvalidParameter { name: "trial_count", .. })
        ));
    }

    #[test]
    fn experiment_params_reject_zero_radius() {
        let mut config = EscapeConfig::default();
        config.physics.escape_radius_m = 0.0;
        assert!(matches!(
            config.experiment_params(),
            Err(WalkError::InvalidParameter { name: "escape_radius_m", .. })
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("escape-config.yaml");
        if path.exists() {
            let config = EscapeConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
