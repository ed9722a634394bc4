//! Leaderboard - finish times across all generations.
//!
//! Entries are kept sorted by time, fastest first. Equal times keep
//! insertion order.

use serde::{Deserialize, Serialize};

/// One finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub generation: u32,
    /// 1-based agent number within its generation.
    pub agent_id: u32,
    /// Finish time in seconds of race time.
    pub time: f64,
    /// Checkpoint hit times in checkpoint order.
    pub checkpoint_times: Vec<f64>,
}

/// Receives every score as it is recorded.
pub trait ScoreSink {
    fn record(&mut self, entry: &ScoreEntry);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ScoreSink for NullSink {
    fn record(&mut self, _entry: &ScoreEntry) {}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, re-sorting in case the source was not.
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { entries }
    }

    /// Insert keeping time order; returns the 0-based rank.
    pub fn insert(&mut self, entry: ScoreEntry) -> usize {
        let rank = self.entries.partition_point(|e| e.time <= entry.time);
        self.entries.insert(rank, entry);
        rank
    }

    /// Drop every entry of `generation`; returns how many were removed.
    pub fn remove_generation(&mut self, generation: u32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.generation != generation);
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn top(&self, n: usize) -> &[ScoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn best(&self) -> Option<&ScoreEntry> {
        self.entries.first()
    }

    /// Fastest entry of one generation.
    pub fn best_of(&self, generation: u32) -> Option<&ScoreEntry> {
        self.entries.iter().find(|e| e.generation == generation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(generation: u32, agent_id: u32, time: f64) -> ScoreEntry {
        ScoreEntry {
            generation,
            agent_id,
            time,
            checkpoint_times: vec![],
        }
    }

    #[test]
    fn insert_keeps_ascending_time() {
        let mut board = Leaderboard::new();
        assert_eq!(board.insert(score(1, 1, 5.0)), 0);
        assert_eq!(board.insert(score(1, 2, 3.0)), 0);
        assert_eq!(board.insert(score(1, 3, 4.0)), 1);
        let times: Vec<f64> = board.entries().iter().map(|e| e.time).collect();
        assert_eq!(times, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut board = Leaderboard::new();
        board.insert(score(1, 1, 2.0));
        board.insert(score(1, 2, 2.0));
        assert_eq!(board.entries()[0].agent_id, 1);
        assert_eq!(board.entries()[1].agent_id, 2);
    }

    #[test]
    fn remove_generation_only_touches_that_generation() {
        let mut board = Leaderboard::from_entries(vec![score(2, 1, 9.0), score(1, 1, 1.0), score(2, 2, 3.0)]);
        assert_eq!(board.remove_generation(2), 2);
        assert_eq!(board.len(), 1);
        assert_eq!(board.best().unwrap().generation, 1);
    }

    #[test]
    fn wire_keys_are_camel_case() {
        let json = serde_json::to_value(ScoreEntry {
            generation: 3,
            agent_id: 7,
            time: 2.5,
            checkpoint_times: vec![1.0, 2.0],
        })
        .unwrap();
        assert_eq!(json["agentId"], 7);
        assert_eq!(json["checkpointTimes"][1], 2.0);
    }
}
