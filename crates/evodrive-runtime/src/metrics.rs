//! Generation and run metrics.
//!
//! [`GenerationStats`] summarizes the live population; [`EvolutionSummary`]
//! summarizes persisted state across every generation, for reporting when
//! no race is running.

use crate::leaderboard::Leaderboard;
use crate::session::EvolutionState;
use evodrive_agents::fitness::mean_fitness;
use evodrive_agents::racer::Racer;
use evodrive_core::types::AgentStatus;
use serde::Serialize;
use std::collections::BTreeMap;

/// Snapshot of the current generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub population: usize,
    pub racing: usize,
    pub finished: usize,
    pub eliminated: usize,
    pub selected: usize,
    pub best_fitness: Option<f64>,
    pub mean_fitness: f64,
    /// Fastest finish of this generation, if anyone finished.
    pub best_finish_time: Option<f64>,
    /// Race seconds since the population started.
    pub elapsed_secs: f64,
}

impl GenerationStats {
    /// `fitness` holds the live fitness of the racers that could be measured.
    pub fn compute(
        generation: u32,
        racers: &[Racer],
        fitness: &[f64],
        selected: usize,
        elapsed_secs: f64,
    ) -> Self {
        let count = |status: AgentStatus| racers.iter().filter(|r| r.status() == status).count();
        Self {
            generation,
            population: racers.len(),
            racing: count(AgentStatus::Racing),
            finished: count(AgentStatus::Finished),
            eliminated: count(AgentStatus::Eliminated),
            selected,
            best_fitness: fitness.iter().copied().reduce(f64::max),
            mean_fitness: mean_fitness(fitness),
            best_finish_time: racers.iter().filter_map(|r| r.finish_time()).reduce(f64::min),
            elapsed_secs,
        }
    }
}

/// Best finish of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationBest {
    pub generation: u32,
    pub agent_id: u32,
    pub time: f64,
    pub finishers: usize,
}

/// Summary of persisted evolution state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionSummary {
    pub generation: u32,
    pub history_entries: usize,
    pub total_scores: usize,
    pub best_time: Option<f64>,
    /// One row per generation that has at least one finisher, oldest first.
    pub per_generation: Vec<GenerationBest>,
}

impl EvolutionSummary {
    pub fn from_state(state: &EvolutionState) -> Self {
        let board = state.leaderboard();
        Self::from_parts(state.generation, state.brain_history.len(), &board)
    }

    pub fn from_parts(generation: u32, history_entries: usize, board: &Leaderboard) -> Self {
        let mut per_generation: BTreeMap<u32, GenerationBest> = BTreeMap::new();
        // Leaderboard is time-ascending, so the first entry seen per generation is its best.
        for entry in board.entries() {
            per_generation
                .entry(entry.generation)
                .and_modify(|best| best.finishers += 1)
                .or_insert(GenerationBest {
                    generation: entry.generation,
                    agent_id: entry.agent_id,
                    time: entry.time,
                    finishers: 1,
                });
        }
        Self {
            generation,
            history_entries,
            total_scores: board.len(),
            best_time: board.best().map(|e| e.time),
            per_generation: per_generation.into_values().collect(),
        }
    }

    /// Improvement of the latest generation's best over the first one's, in seconds.
    pub fn improvement(&self) -> Option<f64> {
        let first = self.per_generation.first()?;
        let last = self.per_generation.last()?;
        Some(first.time - last.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::ScoreEntry;

    fn score(generation: u32, agent_id: u32, time: f64) -> ScoreEntry {
        ScoreEntry {
            generation,
            agent_id,
            time,
            checkpoint_times: vec![],
        }
    }

    #[test]
    fn summary_groups_by_generation() {
        let board = Leaderboard::from_entries(vec![
            score(1, 2, 12.0),
            score(1, 5, 10.0),
            score(2, 1, 8.5),
        ]);
        let summary = EvolutionSummary::from_parts(3, 2, &board);
        assert_eq!(summary.total_scores, 3);
        assert_eq!(summary.best_time, Some(8.5));
        assert_eq!(summary.per_generation.len(), 2);
        assert_eq!(summary.per_generation[0].agent_id, 5);
        assert_eq!(summary.per_generation[0].finishers, 2);
        assert_eq!(summary.improvement(), Some(1.5));
    }

    #[test]
    fn empty_board_has_no_best() {
        let summary = EvolutionSummary::from_parts(1, 0, &Leaderboard::new());
        assert_eq!(summary.best_time, None);
        assert_eq!(summary.improvement(), None);
    }
}
