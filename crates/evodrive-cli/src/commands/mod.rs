//! CLI command implementations.

pub mod init;
pub mod run;
pub mod leaderboard;
pub mod history;
pub mod stats;

use anyhow::{Context, Result};
use evodrive::prelude::*;

use crate::config::{data_dir, Config};

/// Store holding this project's evolution state for the configured track.
pub fn open_store(config: &Config) -> Result<JsonFileStore> {
    Ok(JsonFileStore::in_dir(&data_dir()?, Some(config.circuit.name.as_str())))
}

/// Build the circuit and a manager resumed from the project's store.
pub fn open_manager(config: &Config, sink: Box<dyn ScoreSink>) -> Result<GeneticManager<Circuit>> {
    let circuit = Circuit::new(config.circuit.clone()).context("Invalid circuit configuration")?;
    let store = open_store(config)?;
    GeneticManager::new(circuit, config.manager.clone(), Box::new(store), sink)
        .context("Failed to start the genetic manager")
}

/// Saved state, if any run has happened in this project.
pub fn load_state(config: &Config) -> Result<Option<EvolutionState>> {
    let store = open_store(config)?;
    store
        .load()
        .with_context(|| format!("Failed to read {}", store.path().display()))
}
