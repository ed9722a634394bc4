//! Shared types used across all evodrive crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monotonic simulation tick counter.
pub type Tick = u64;

/// Unique identifier for an agent within a generation.
///
/// Identity never crosses generations: a new generation always gets
/// fresh ids, only genomes are carried over (by cloning).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a deterministic id (for testing).
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(seed, seed.rotate_left(17)))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle of a vehicle body inside the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// A point in track space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Position and heading of a vehicle. `angle` is the heading in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self { x, y, angle }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Linear and angular velocity of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
    /// Angular velocity (radians per second).
    pub omega: f64,
}

impl Velocity {
    pub fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    /// Magnitude of the linear velocity.
    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

/// The 4-way control vector every controller produces, each channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlVector {
    pub left: f64,
    pub right: f64,
    pub up: f64,
    pub down: f64,
}

impl ControlVector {
    /// Number of output channels a controller produces.
    pub const CHANNELS: usize = 4;

    /// All channels at zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from raw outputs in channel order `[up, down, left, right]`.
    ///
    /// Missing channels read as zero; values are clamped to [0, 1].
    pub fn from_outputs(outputs: &[f64]) -> Self {
        let at = |i: usize| outputs.get(i).copied().unwrap_or(0.0).clamp(0.0, 1.0);
        Self {
            up: at(0),
            down: at(1),
            left: at(2),
            right: at(3),
        }
    }

    /// Map to the command applied to the vehicle.
    ///
    /// Left steers negative, right (when non-zero) overrides it, up is
    /// throttle and down is brake.
    pub fn to_drive(&self) -> DriveCommand {
        let mut steer = 0.0;
        if self.left > 0.0 {
            steer = -self.left;
        }
        if self.right > 0.0 {
            steer = self.right;
        }
        DriveCommand {
            steer,
            throttle: self.up,
            brake: self.down,
        }
    }
}

/// Normalized command handed to the physics collaborator.
///
/// `steer` is in [-1, 1] (negative = left), `throttle` and `brake` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    pub steer: f64,
    pub throttle: f64,
    pub brake: f64,
}

impl DriveCommand {
    /// Zero steer, zero throttle, zero brake.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::idle()
    }
}

/// Race status of an agent. Terminal states are sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    /// Still driving.
    Racing,
    /// Crashed into a wall with elimination enabled.
    Eliminated,
    /// Crossed the finish line with every checkpoint hit.
    Finished,
}

impl AgentStatus {
    /// Whether no further control updates apply.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Eliminated | AgentStatus::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_map_to_channels_in_order() {
        let c = ControlVector::from_outputs(&[0.9, 0.1, 0.2, 0.3]);
        assert_eq!(c.up, 0.9);
        assert_eq!(c.down, 0.1);
        assert_eq!(c.left, 0.2);
        assert_eq!(c.right, 0.3);
    }

    #[test]
    fn right_overrides_left_when_both_held() {
        let c = ControlVector { left: 1.0, right: 0.5, up: 0.0, down: 0.0 };
        assert_eq!(c.to_drive().steer, 0.5);

        let c = ControlVector { left: 0.7, right: 0.0, up: 1.0, down: 0.0 };
        let d = c.to_drive();
        assert_eq!(d.steer, -0.7);
        assert_eq!(d.throttle, 1.0);
    }

    #[test]
    fn terminal_states() {
        assert!(!AgentStatus::Racing.is_terminal());
        assert!(AgentStatus::Eliminated.is_terminal());
        assert!(AgentStatus::Finished.is_terminal());
    }

    #[test]
    fn speed_is_linear_magnitude() {
        let v = Velocity::new(3.0, 4.0, 10.0);
        assert!((v.speed() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn body_ids_order_by_spawn_number() {
        let bodies: std::collections::BTreeSet<BodyId> = [BodyId(2), BodyId(0), BodyId(1)].into_iter().collect();
        assert_eq!(bodies.into_iter().collect::<Vec<_>>(), vec![BodyId(0), BodyId(1), BodyId(2)]);
    }
}
