//! Load generator for the eventq priority queue.
//!
//! Plays the part of the surrounding system: it owns a set of emitters and
//! resources, runs producer threads that push randomized events into one
//! shared queue and consumer threads that poll it, then checks that every
//! pushed event was popped exactly once.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `eventq-loadgen.yaml`
//! 3. Run the workload
//! 4. Log the report

mod config;
mod error;
mod workload;

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::LoadgenConfig;
use crate::error::LoadgenError;

/// Path of the optional configuration file, relative to the working
/// directory.
const CONFIG_PATH: &str = "eventq-loadgen.yaml";

/// Application entry point for the load generator.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a worker fails, or the
/// run loses events.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("eventq-loadgen starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        producers = config.producers,
        consumers = config.consumers,
        events_per_producer = config.events_per_producer,
        capacity = config.queue.capacity,
        "Configuration loaded"
    );

    // 3. Run the workload.
    let report = workload::run(&config)?;

    // 4. Log results.
    for (priority, count) in &report.by_priority {
        info!(priority = %priority, count, "Popped by priority");
    }
    for (status, count) in &report.by_status {
        info!(status = %status, count, "Popped by status");
    }
    info!(
        pushed = report.pushed,
        popped = report.popped,
        retries = report.retries,
        high_water = report.stats.high_water,
        released = report.released,
        "eventq-loadgen finished: {report}"
    );

    Ok(())
}

/// Load the workload configuration from `eventq-loadgen.yaml`.
///
/// Falls back to defaults when the file does not exist.
fn load_config() -> Result<LoadgenConfig, LoadgenError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = LoadgenConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(LoadgenConfig::default())
    }
}
