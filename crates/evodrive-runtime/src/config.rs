//! Manager configuration.
//!
//! Every tunable of a training run lives here, grouped the way the
//! pieces that consume them are grouped. All sections deserialize with
//! defaults for missing fields, so a partial TOML or JSON file is fine.

use evodrive_agents::breeding::BreedingStrategy;
use evodrive_agents::controller::ControllerConfig;
use evodrive_agents::fitness::FitnessWeights;
use evodrive_agents::genome::MutationPolicy;
use evodrive_agents::racer::RaceRules;
use evodrive_agents::sensor::SensorConfig;
use evodrive_core::error::{RaceError, Result};
use evodrive_core::types::ControlVector;
use serde::{Deserialize, Serialize};

/// Population and generation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Agents per generation (default: 10).
    pub size: usize,
    /// Seconds after which two selections end the generation (default: 30).
    pub time_budget_secs: f64,
    /// Simulation ticks per second (default: 60).
    pub tick_rate: u32,
    /// Ticks of idle countdown before the race clock starts (default: 0).
    pub countdown_ticks: u64,
    /// How two selected parents are combined (default: split).
    pub breeding: BreedingStrategy,
    /// Seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 10,
            time_budget_secs: 30.0,
            tick_rate: 60,
            countdown_ticks: 0,
            breeding: BreedingStrategy::Split,
            seed: None,
        }
    }
}

/// Genome layout and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeConfig {
    /// Hidden layer width (default: 6).
    pub hidden_size: usize,
    /// Mutation applied to cloned parents (default: per-weight 0.1 / 0.1).
    pub mutation: MutationPolicy,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            hidden_size: 6,
            mutation: MutationPolicy::default(),
        }
    }
}

/// Complete configuration of a [`GeneticManager`](crate::manager::GeneticManager).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub population: PopulationConfig,
    pub sensors: SensorConfig,
    pub genome: GenomeConfig,
    pub controller: ControllerConfig,
    pub rules: RaceRules,
    pub fitness: FitnessWeights,
}

impl ManagerConfig {
    /// `(input, hidden, output)` widths of every genome in this run.
    pub fn genome_shape(&self) -> (usize, usize, usize) {
        (
            self.sensors.input_size(),
            self.genome.hidden_size,
            ControlVector::CHANNELS,
        )
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / self.population.tick_rate.max(1) as f64
    }

    pub fn validate(&self) -> Result<()> {
        if self.population.size == 0 {
            return Err(RaceError::invalid_config("population.size", "0", "population must not be empty"));
        }
        if self.population.tick_rate == 0 {
            return Err(RaceError::invalid_config("population.tick_rate", "0", "tick rate must be positive"));
        }
        if !(self.population.time_budget_secs >= 0.0) {
            return Err(RaceError::invalid_config(
                "population.time_budget_secs",
                self.population.time_budget_secs.to_string(),
                "must be non-negative",
            ));
        }
        if self.genome.hidden_size == 0 {
            return Err(RaceError::invalid_config("genome.hidden_size", "0", "hidden layer must not be empty"));
        }
        if let MutationPolicy::PerWeight { probability, .. } = self.genome.mutation {
            if !(0.0..=1.0).contains(&probability) {
                return Err(RaceError::out_of_range("genome.mutation.probability", 0.0, 1.0, probability));
            }
        }
        if !(self.genome.mutation.magnitude() >= 0.0) {
            return Err(RaceError::invalid_config(
                "genome.mutation.magnitude",
                self.genome.mutation.magnitude().to_string(),
                "must be non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.rules.wall_damping) {
            return Err(RaceError::out_of_range("rules.wall_damping", 0.0, 1.0, self.rules.wall_damping));
        }
        self.sensors.validate()?;
        self.fitness.validate()?;
        Ok(())
    }
}
