//! Evodrive Runtime Prelude - convenient imports for common usage.
//!
//! ```rust
//! use evodrive_runtime::prelude::*;
//! ```

// Re-export manager
pub use crate::manager::{GeneticManager, RaceEvent};
pub use crate::config::{GenomeConfig, ManagerConfig, PopulationConfig};

// Re-export history, scores and persistence
pub use crate::history::{EvolutionHistory, HistoryEntry};
pub use crate::leaderboard::{Leaderboard, NullSink, ScoreEntry, ScoreSink};
pub use crate::session::{EvolutionState, EvolutionStore, JsonFileStore, MemoryStore};

// Re-export metrics
pub use crate::metrics::{EvolutionSummary, GenerationStats};

// Re-export the reference circuit
pub use crate::circuit::{Circuit, CircuitConfig};

// Re-export from agents
pub use evodrive_agents::prelude::*;
