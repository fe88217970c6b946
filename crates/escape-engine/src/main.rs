//! Escape engine binary.
//!
//! Runs the random-walk escape experiment end to end and reports how the
//! measured mean step count compares with the diffusion estimate.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `escape-config.yaml` (or `$ESCAPE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Derive the escape geometry and experiment parameters
//! 4. Log the diffusion estimate
//! 5. Run the trials
//! 6. Report the summary as log lines or as JSON on stdout

mod error;
mod report;

use std::path::PathBuf;
use std::time::Instant;

use escape_core::{EscapeConfig, ReportFormat, run_experiment, walk_rng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::report::{LoggingObserver, RunSummary, log_estimate};

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "escape-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid or a walk fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, config_path, found) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config)?;
    info!("escape-engine starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Derive the geometry and experiment parameters.
    let geometry = config.geometry()?;
    let params = config.experiment_params()?;
    info!(
        dimension = params.walk.dimension,
        trials = params.trial_count,
        target_radius = params.walk.target_radius,
        progress_interval = params.walk.progress_interval,
        seed = config.simulation.seed,
        max_steps = params.walk.max_steps,
        "Experiment parameters"
    );

    // 4. Log the diffusion estimate.
    log_estimate(&geometry);

    // 5. Run the trials.
    let started = Instant::now();
    let mut rng = walk_rng(config.simulation.seed);
    let mut observer = LoggingObserver::default();
    let aggregate = run_experiment(&params, &mut rng, &mut observer)?;
    let summary = RunSummary::new(&geometry, params.walk.dimension, &aggregate, started.elapsed());

    // 6. Report.
    match config.report.format {
        ReportFormat::Text => summary.log(),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }

    info!("escape-engine finished");
    Ok(())
}

/// Load the configuration file named by `ESCAPE_CONFIG`, or the default path.
///
/// A missing file yields the default configuration. Returns the config,
/// the path that was tried, and whether the file existed.
fn load_config() -> Result<(EscapeConfig, PathBuf, bool), EngineError> {
    let path = std::env::var_os("ESCAPE_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = EscapeConfig::from_file(&path)?;
        Ok((config, path, true))
    } else {
        Ok((EscapeConfig::default(), path, false))
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &EscapeConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    let installed = if config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}
