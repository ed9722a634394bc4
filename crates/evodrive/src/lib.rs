//! # Evodrive
//!
//! Human-in-the-loop neuroevolution of racing agents on a closed track.
//!
//! A population of vehicles drives a track together. Each vehicle is steered
//! by a small feed-forward network that reads distance rays and its own
//! speed. When a generation ends, one or two agents are picked as parents
//! and the next generation is bred from them.
//!
//! ## Quick Start
//!
//! ```rust
//! use evodrive::prelude::*;
//!
//! let circuit = Circuit::new(CircuitConfig::default()).unwrap();
//! let mut config = ManagerConfig::default();
//! config.population.size = 6;
//! config.population.seed = Some(1);
//!
//! let mut manager = GeneticManager::in_memory(circuit, config).unwrap();
//! manager.run(120);
//!
//! // pick the fittest agent and breed from it
//! let (best, _) = manager.ranking()[0];
//! manager.select_agent(best);
//! manager.evolve().unwrap();
//! assert_eq!(manager.generation(), 2);
//! ```
//!
//! ## Architecture
//!
//! - [`evodrive_core`] - Shared types, errors, and the `Physics`/`Track` collaborator traits
//! - [`evodrive_agents`] - Genomes, sensors, controllers, checkpoints, fitness, breeding
//! - [`evodrive_runtime`] - Generation lifecycle, history, leaderboard, persistence, reference circuit
//!
//! ## Generation lifecycle
//!
//! | Operation | Generation | History |
//! |-----------|------------|---------|
//! | `evolve` | +1 | parents appended |
//! | `restart_generation` | unchanged | selection appended, if any |
//! | `undo_last_evolution` | -1 | last entry dropped |
//! | `reset_evolution` | back to 1 | cleared |
//!
//! ## Persistence
//!
//! ```rust,ignore
//! use evodrive::prelude::*;
//! use std::path::Path;
//!
//! let circuit = Circuit::new(CircuitConfig::default())?;
//! let store = JsonFileStore::in_dir(Path::new(".evodrive"), circuit.track_id().as_deref());
//! let manager = GeneticManager::new(circuit, ManagerConfig::default(), Box::new(store), Box::new(NullSink))?;
//! ```

// Re-export all subcrates
pub use evodrive_core as core;
pub use evodrive_agents as agents;
pub use evodrive_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use evodrive::prelude::*;
/// ```
pub mod prelude {
    pub use evodrive_runtime::prelude::*;
}
