//! Track - the static layout agents race on.

use crate::types::Point;

/// Read-only description of a closed track.
///
/// Checkpoint indices are dense: `0..checkpoint_count()`.
pub trait Track {
    /// Number of checkpoints that must be hit before the finish counts.
    fn checkpoint_count(&self) -> usize;

    /// Center of checkpoint `index`, or `None` when out of range.
    fn checkpoint_position(&self, index: usize) -> Option<Point>;

    /// Center of the finish zone.
    fn finish_position(&self) -> Point;

    /// Identifier used to key persisted state per track.
    fn track_id(&self) -> Option<String> {
        None
    }
}
