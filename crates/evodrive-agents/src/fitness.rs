//! Live fitness for ranking agents during a race.
//!
//! Fitness rewards checkpoint progress, punishes wall hits, and breaks
//! ties by closeness to the next checkpoint. It is a running score for
//! ranking within a generation; the leaderboard orders by finish time.

use evodrive_core::error::{RaceError, Result};
use evodrive_core::types::AgentId;
use serde::{Deserialize, Serialize};

/// Weights of the live fitness function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Reward per checkpoint hit.
    pub checkpoint: f64,
    /// Penalty per wall collision.
    pub wall_penalty: f64,
    /// Penalty per unit of distance to the next checkpoint.
    pub distance: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            checkpoint: 1000.0,
            wall_penalty: 500.0,
            distance: 3.0,
        }
    }
}

impl FitnessWeights {
    /// `checkpoints * W_checkpoint - wall_hits * W_wall - distance * W_distance`.
    pub fn score(&self, checkpoints_hit: usize, wall_hits: u32, distance_to_next: f64) -> f64 {
        checkpoints_hit as f64 * self.checkpoint
            - wall_hits as f64 * self.wall_penalty
            - distance_to_next * self.distance
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("fitness.checkpoint", self.checkpoint),
            ("fitness.wall_penalty", self.wall_penalty),
            ("fitness.distance", self.distance),
        ] {
            if !(value >= 0.0) {
                return Err(RaceError::invalid_config(field, value.to_string(), "weights must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Sort `(id, fitness)` pairs fittest first.
pub fn rank_descending(scores: &mut [(AgentId, f64)]) {
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}

/// Mean of a set of fitness values; 0 when empty.
pub fn mean_fitness(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoints_dominate_distance() {
        let w = FitnessWeights::default();
        let ahead = w.score(2, 0, 100.0);
        let behind = w.score(1, 0, 0.0);
        assert!(ahead > behind);
    }

    #[test]
    fn wall_hits_cost() {
        let w = FitnessWeights::default();
        assert_eq!(w.score(1, 1, 0.0), 500.0);
    }

    #[test]
    fn ranking_is_descending() {
        let a = AgentId::from_seed(1);
        let b = AgentId::from_seed(2);
        let mut scores = vec![(a, 10.0), (b, 20.0)];
        rank_descending(&mut scores);
        assert_eq!(scores[0].0, b);
        assert_eq!(mean_fitness(&[10.0, 20.0]), 15.0);
    }

    #[test]
    fn negative_weights_rejected() {
        let w = FitnessWeights { distance: -1.0, ..FitnessWeights::default() };
        assert!(w.validate().is_err());
    }
}
