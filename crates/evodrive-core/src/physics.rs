//! Physics - the world every vehicle drives in.
//!
//! The training core never integrates motion itself. It spawns bodies,
//! pushes drive commands into them, steps the world, and reacts to the
//! contacts the world reports back. Anything that can do those things
//! (a full rigid-body engine or a toy kinematic model) implements
//! [`Physics`].

use crate::error::Result;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Collision layers a ray can hit.
///
/// Sensor rays only ever see walls. Checkpoint, start and finish zones are
/// sensors in the physics world and must be transparent to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const WALLS: LayerMask = LayerMask(0b0001);
    pub const CHECKPOINTS: LayerMask = LayerMask(0b0010);
    pub const VEHICLES: LayerMask = LayerMask(0b0100);

    pub fn contains(&self, other: LayerMask) -> bool {
        self.0 & other.0 == other.0
    }
}

/// What a vehicle touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    /// Entered the checkpoint zone with the given index.
    Checkpoint(usize),
    /// Entered the start zone.
    Start,
    /// Entered the finish zone.
    Finish,
    /// Touched a wall.
    Wall,
}

/// A contact reported by the physics world after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub body: BodyId,
    pub kind: ContactKind,
}

impl Contact {
    pub fn new(body: BodyId, kind: ContactKind) -> Self {
        Self { body, kind }
    }
}

/// The physics collaborator.
///
/// Per-body queries return `Err` when a body is unknown; the manager logs
/// those and treats the agent as idle for the tick instead of aborting.
pub trait Physics {
    /// Create a vehicle body at the track's start pose.
    fn spawn_vehicle(&mut self) -> BodyId;

    /// Destroy a vehicle body. Unknown ids are ignored.
    fn remove_vehicle(&mut self, body: BodyId);

    /// Advance the world by `dt` seconds and return the contacts that
    /// began during the step.
    fn step_world(&mut self, dt: f64) -> Vec<Contact>;

    /// Current pose of a body.
    fn pose(&self, body: BodyId) -> Result<Pose>;

    /// Current velocity of a body.
    fn velocity(&self, body: BodyId) -> Result<Velocity>;

    /// Cast a ray of length `max_len` and return the fraction of that
    /// length travelled before the first hit on `mask`, in (0, 1]. A miss
    /// reads 1.0.
    fn cast_ray(&self, origin: Point, angle: f64, max_len: f64, mask: LayerMask) -> Result<f64>;

    /// Apply a drive command to a body for the next step.
    fn apply_controls(&mut self, body: BodyId, command: DriveCommand) -> Result<()>;

    /// Scale a body's linear and angular velocity by `factor`.
    fn damp_velocity(&mut self, body: BodyId, factor: f64) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_containment() {
        let both = LayerMask(LayerMask::WALLS.0 | LayerMask::VEHICLES.0);
        assert!(both.contains(LayerMask::WALLS));
        assert!(!both.contains(LayerMask::CHECKPOINTS));
        assert!(!LayerMask::WALLS.contains(LayerMask::CHECKPOINTS));
    }
}
