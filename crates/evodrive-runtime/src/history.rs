//! Evolution history - the parents behind every generation.
//!
//! Append-only in normal operation; only undo pops. Only the last entry
//! is ever read back to rebuild a population.

use evodrive_agents::genome::Genome;

/// Parent genomes selected in one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Generation the parents raced in.
    pub generation: u32,
    pub parents: Vec<Genome>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvolutionHistory {
    entries: Vec<HistoryEntry>,
}

impl EvolutionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, generation: u32, parents: Vec<Genome>) {
        self.entries.push(HistoryEntry { generation, parents });
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
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

    fn genome(v: f64) -> Genome {
        Genome::from_weights(vec![vec![v]], vec![vec![v; 4]]).unwrap()
    }

    #[test]
    fn last_entry_wins() {
        let mut h = EvolutionHistory::new();
        h.push(1, vec![genome(1.0)]);
        h.push(2, vec![genome(2.0), genome(3.0)]);
        assert_eq!(h.len(), 2);
        assert_eq!(h.last().unwrap().generation, 2);
        assert_eq!(h.pop().unwrap().parents.len(), 2);
        assert_eq!(h.last().unwrap().generation, 1);
    }
}
