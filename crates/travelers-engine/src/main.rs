//! Engine binary for the travelers simulation.
//!
//! Runs one simulation and prints the event stream on stdout: the header
//! line `-1 <entities> <width> <height>` followed by one
//! `<timestamp> <id> <x> <y> <symbol>` line per event. Logs go to stderr so
//! the stream can be piped straight into a viewer.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing) on stderr
//! 2. Load configuration from `$TRAVELERS_CONFIG` or `travelers-config.yaml`
//! 3. Run the simulation into a buffered stdout sink
//! 4. Log the outcome summary

mod error;

use std::io::{BufWriter, Stdout};
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;
use travelers_core::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use travelers_core::{SimulationConfig, run_simulation};
use travelers_events::TextSink;

use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is unusable or the run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!("travelers-engine starting");

    let config = load_config()?;
    info!(
        width = config.world.width,
        height = config.world.height,
        traps = config.world.traps,
        seed = ?config.world.seed,
        travelers = config.travelers.count,
        max_squatters = config.squatters.max_squatters,
        "Configuration loaded"
    );

    let sink: TextSink<BufWriter<Stdout>> = TextSink::new(BufWriter::new(std::io::stdout()));
    let result = run_simulation(&config, sink).await.map_err(EngineError::from)?;

    info!(
        seed = result.seed,
        travelers = result.tally.travelers(),
        squatters = result.tally.squatters(),
        events = result.stats.events,
        "travelers-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// The path comes from `TRAVELERS_CONFIG` when set, otherwise
/// `travelers-config.yaml` in the working directory. A missing default file
/// means built-in defaults; a missing explicit file is an error.
fn load_config() -> Result<SimulationConfig, EngineError> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        let config = SimulationConfig::from_file(&PathBuf::from(explicit))?;
        return Ok(config);
    }

    let config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(&config_path)?)
    } else {
        info!("Config file not found, using defaults");
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}
