//! Checkpoint progress of a single agent.
//!
//! Each checkpoint index is recorded at most once, together with the race
//! time of the hit. The finish line only counts once every checkpoint has
//! been hit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which checkpoint contacts count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointOrder {
    /// Only the next expected index counts.
    #[default]
    Strict,
    /// Any index not yet hit counts.
    AnyOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    order: CheckpointOrder,
    total: usize,
    hit: BTreeSet<usize>,
    /// Hit time per checkpoint index.
    times: Vec<Option<f64>>,
    next_expected: usize,
    all_hit: bool,
}

impl CheckpointState {
    pub fn new(total: usize, order: CheckpointOrder) -> Self {
        Self {
            order,
            total,
            hit: BTreeSet::new(),
            times: vec![None; total],
            next_expected: 0,
            // A track without checkpoints is finishable straight away.
            all_hit: total == 0,
        }
    }

    /// Record a contact with checkpoint `index` at race time `time`.
    ///
    /// Returns whether the contact counted. Repeats, out-of-range indices
    /// and (under [`CheckpointOrder::Strict`]) out-of-order hits are no-ops.
    pub fn record_hit(&mut self, index: usize, time: f64) -> bool {
        if index >= self.total || self.hit.contains(&index) {
            return false;
        }
        if self.order == CheckpointOrder::Strict && index != self.next_expected {
            return false;
        }
        self.hit.insert(index);
        self.times[index] = Some(time);
        if self.order == CheckpointOrder::Strict {
            self.next_expected += 1;
        }
        if self.hit.len() == self.total {
            self.all_hit = true;
        }
        true
    }

    pub fn order(&self) -> CheckpointOrder {
        self.order
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn hit_count(&self) -> usize {
        self.hit.len()
    }

    pub fn is_hit(&self, index: usize) -> bool {
        self.hit.contains(&index)
    }

    pub fn all_hit(&self) -> bool {
        self.all_hit
    }

    /// Next index expected under strict order.
    pub fn next_expected(&self) -> usize {
        self.next_expected
    }

    /// The checkpoint the agent should head for, or `None` once all are hit.
    ///
    /// Strict order follows the pointer; any-order takes the lowest
    /// index not hit yet.
    pub fn next_target(&self) -> Option<usize> {
        if self.all_hit {
            return None;
        }
        match self.order {
            CheckpointOrder::Strict => Some(self.next_expected),
            CheckpointOrder::AnyOrder => (0..self.total).find(|i| !self.hit.contains(i)),
        }
    }

    /// Recorded hit times in checkpoint index order, skipping unhit
    /// checkpoints. Positions line up with indices only once every
    /// checkpoint is hit; use [`split_times`](Self::split_times) for
    /// partial progress.
    pub fn checkpoint_times(&self) -> Vec<f64> {
        self.times.iter().flatten().copied().collect()
    }

    /// Hit time per checkpoint index, `None` where not hit yet.
    pub fn split_times(&self) -> &[Option<f64>] {
        &self.times
    }

    pub fn checkpoint_time(&self, index: usize) -> Option<f64> {
        self.times.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_any_order_times_stay_indexed() {
        let mut cp = CheckpointState::new(3, CheckpointOrder::AnyOrder);
        assert!(cp.record_hit(2, 4.5));
        assert_eq!(cp.split_times(), &[None, None, Some(4.5)]);
        assert_eq!(cp.checkpoint_time(2), Some(4.5));
        assert_eq!(cp.checkpoint_time(0), None);
        assert_eq!(cp.checkpoint_time(7), None);

        assert!(cp.record_hit(0, 6.0));
        assert!(cp.record_hit(1, 7.0));
        assert_eq!(cp.checkpoint_times(), vec![6.0, 7.0, 4.5]);
    }

    #[test]
    fn repeat_hit_is_noop() {
        let mut cp = CheckpointState::new(3, CheckpointOrder::Strict);
        assert!(cp.record_hit(0, 1.0));
        assert!(!cp.record_hit(0, 1.5));
        assert_eq!(cp.hit_count(), 1);
        assert_eq!(cp.checkpoint_times(), vec![1.0]);
    }

    #[test]
    fn strict_order_rejects_skips() {
        let mut cp = CheckpointState::new(3, CheckpointOrder::Strict);
        assert!(!cp.record_hit(1, 0.5));
        assert!(cp.record_hit(0, 1.0));
        assert!(cp.record_hit(1, 2.0));
        assert_eq!(cp.next_expected(), 2);
        assert_eq!(cp.next_target(), Some(2));
        assert!(!cp.all_hit());
        assert!(cp.record_hit(2, 3.0));
        assert!(cp.all_hit());
        assert_eq!(cp.next_target(), None);
    }

    #[test]
    fn any_order_accepts_unhit_indices() {
        let mut cp = CheckpointState::new(3, CheckpointOrder::AnyOrder);
        assert!(cp.record_hit(2, 1.0));
        assert!(cp.record_hit(0, 2.0));
        assert_eq!(cp.next_target(), Some(1));
        assert!(cp.record_hit(1, 3.0));
        assert!(cp.all_hit());
        // times come back in index order, not hit order
        assert_eq!(cp.checkpoint_times(), vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut cp = CheckpointState::new(2, CheckpointOrder::AnyOrder);
        assert!(!cp.record_hit(5, 1.0));
        assert_eq!(cp.hit_count(), 0);
    }

    #[test]
    fn empty_track_is_complete() {
        let cp = CheckpointState::new(0, CheckpointOrder::Strict);
        assert!(cp.all_hit());
    }
}
