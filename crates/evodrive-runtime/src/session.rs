//! Session persistence - save/load evolution state.
//!
//! The persisted record holds the current generation number, every
//! history entry's parent genomes, and the leaderboard:
//!
//! ```json
//! { "generation": 3,
//!   "brainHistory": [{ "generation": 1, "brains": [{ "weights": { "hidden": [[..]], "output": [[..]] } }] }],
//!   "scores": [{ "generation": 1, "agentId": 4, "time": 12.5, "checkpointTimes": [3.1, 7.9] }] }
//! ```
//!
//! Persistence is best-effort. Callers log failures and keep going with
//! the in-memory state.

use crate::history::{EvolutionHistory, HistoryEntry};
use crate::leaderboard::{Leaderboard, ScoreEntry};
use evodrive_agents::serialize::{genomes_from_records, GenomeRecord};
use evodrive_core::error::{PersistenceError, RaceError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Stored parents of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainHistoryRecord {
    pub generation: u32,
    pub brains: Vec<GenomeRecord>,
}

/// Everything persisted between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionState {
    pub generation: u32,
    #[serde(default)]
    pub brain_history: Vec<BrainHistoryRecord>,
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
}

impl EvolutionState {
    /// Snapshot the manager-side structures.
    pub fn capture(generation: u32, history: &EvolutionHistory, leaderboard: &Leaderboard) -> Self {
        Self {
            generation,
            brain_history: history
                .entries()
                .iter()
                .map(|entry| BrainHistoryRecord {
                    generation: entry.generation,
                    brains: entry.parents.iter().map(GenomeRecord::from_genome).collect(),
                })
                .collect(),
            scores: leaderboard.entries().to_vec(),
        }
    }

    /// Rebuild the history, validating every stored genome.
    pub fn history(&self) -> Result<EvolutionHistory> {
        let entries = self
            .brain_history
            .iter()
            .map(|record| {
                if record.brains.is_empty() {
                    return Err(RaceError::Persistence(PersistenceError::Corrupt(format!(
                        "history entry for generation {} has no genomes",
                        record.generation
                    ))));
                }
                Ok(HistoryEntry {
                    generation: record.generation,
                    parents: genomes_from_records(&record.brains)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(EvolutionHistory::from_entries(entries))
    }

    pub fn leaderboard(&self) -> Leaderboard {
        Leaderboard::from_entries(self.scores.clone())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where evolution state lives between sessions.
pub trait EvolutionStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<EvolutionState>>;

    fn save(&mut self, state: &EvolutionState) -> Result<()>;

    fn clear(&mut self) -> Result<()>;
}

/// JSON file store. One slot per track, or a single shared slot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `evolution.json`, or `evolution-<track>.json` when a track id is given.
    pub fn in_dir(dir: &Path, track_id: Option<&str>) -> Self {
        let file = match track_id {
            Some(id) => format!("evolution-{}.json", sanitize(id)),
            None => "evolution.json".to_string(),
        };
        Self::new(dir.join(file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl EvolutionStore for JsonFileStore {
    fn load(&self) -> Result<Option<EvolutionState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        EvolutionState::from_json(&json).map(Some)
    }

    fn save(&mut self, state: &EvolutionState) -> Result<()> {
        let json = state.to_json()?;

        // Create parent directory if needed
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store. Clones share the same slot, so a test can keep a
/// handle while the manager owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<EvolutionState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: EvolutionState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<EvolutionState>>> {
        self.slot
            .lock()
            .map_err(|_| RaceError::Persistence(PersistenceError::Io("memory store lock poisoned".into())))
    }
}

impl EvolutionStore for MemoryStore {
    fn load(&self) -> Result<Option<EvolutionState>> {
        Ok(self.lock()?.clone())
    }

    fn save(&mut self, state: &EvolutionState) -> Result<()> {
        *self.lock()? = Some(state.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
