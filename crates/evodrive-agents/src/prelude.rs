//! Evodrive Agents Prelude - convenient imports for common usage.
//!
//! ```rust
//! use evodrive_agents::prelude::*;
//! ```

// Re-export agent types
pub use crate::genome::{Genome, GenomeShape, MutationPolicy};
pub use crate::sensor::{SensorArray, SensorConfig, SensorReading};
pub use crate::controller::{
    Controller, ControllerConfig, HumanController, Key, KeyState, NeuralController, OutputMode,
};
pub use crate::checkpoint::{CheckpointOrder, CheckpointState};
pub use crate::racer::{ContactOutcome, RaceRules, Racer};
pub use crate::fitness::FitnessWeights;
pub use crate::breeding::{breed_population, BreedingStrategy};
pub use crate::serialize::GenomeRecord;

// Re-export from core
pub use evodrive_core::prelude::*;
