//! Racer - one controller bound to one vehicle body.
//!
//! A racer starts `Racing` and ends either `Finished` (finish line with
//! every checkpoint hit) or `Eliminated` (fast wall contact with
//! elimination enabled). Both end states are sticky: a terminal racer
//! ignores contacts and only ever emits the idle command.

use crate::checkpoint::{CheckpointOrder, CheckpointState};
use crate::controller::Controller;
use crate::fitness::FitnessWeights;
use crate::genome::Genome;
use crate::sensor::SensorArray;
use evodrive_core::error::Result;
use evodrive_core::physics::{ContactKind, Physics};
use evodrive_core::track::Track;
use evodrive_core::types::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Contact rules shared by every racer in a generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceRules {
    pub checkpoint_order: CheckpointOrder,
    /// Wall contacts at or below this speed have no effect.
    pub wall_speed_threshold: f64,
    /// Velocity factor applied on a counted wall contact.
    pub wall_damping: f64,
    /// Whether a counted wall contact eliminates the racer.
    pub eliminate_on_wall: bool,
}

impl Default for RaceRules {
    fn default() -> Self {
        Self {
            checkpoint_order: CheckpointOrder::Strict,
            wall_speed_threshold: 0.1,
            wall_damping: 0.5,
            eliminate_on_wall: true,
        }
    }
}

/// What a contact did to a racer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    /// No state change.
    Ignored,
    /// Checkpoint `index` counted at race time `time`.
    CheckpointHit { index: usize, time: f64 },
    /// Crossed the finish with every checkpoint hit.
    Finished { time: f64 },
    /// Counted wall contact. The caller damps the body and idles the engine.
    WallHit { eliminated: bool },
}

#[derive(Debug, Clone)]
pub struct Racer {
    id: AgentId,
    /// Position in the population, 0-based.
    index: usize,
    body: BodyId,
    controller: Controller,
    checkpoints: CheckpointState,
    wall_hits: u32,
    race_time: f64,
    status: AgentStatus,
    finish_time: Option<f64>,
    score_reported: bool,
}

impl Racer {
    pub fn new(
        index: usize,
        body: BodyId,
        controller: Controller,
        checkpoint_count: usize,
        order: CheckpointOrder,
    ) -> Self {
        Self {
            id: AgentId::new(),
            index,
            body,
            controller,
            checkpoints: CheckpointState::new(checkpoint_count, order),
            wall_hits: 0,
            race_time: 0.0,
            status: AgentStatus::Racing,
            finish_time: None,
            score_reported: false,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based number shown to the operator and stored with scores.
    pub fn number(&self) -> u32 {
        self.index as u32 + 1
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn genome(&self) -> Option<&Genome> {
        self.controller.genome()
    }

    pub fn checkpoints(&self) -> &CheckpointState {
        &self.checkpoints
    }

    pub fn wall_hits(&self) -> u32 {
        self.wall_hits
    }

    pub fn race_time(&self) -> f64 {
        self.race_time
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn finish_time(&self) -> Option<f64> {
        self.finish_time
    }

    /// Advance the race clock. Frozen once terminal.
    pub fn set_race_time(&mut self, time: f64) {
        if !self.is_terminal() {
            self.race_time = time;
        }
    }

    /// Sense the world and ask the controller for controls.
    ///
    /// Reads only physics state; terminal racers return zero controls.
    pub fn think<P: Physics + ?Sized>(&self, physics: &P, sensors: &SensorArray) -> Result<ControlVector> {
        if self.is_terminal() {
            return Ok(ControlVector::zero());
        }
        let pose = physics.pose(self.body)?;
        let speed = physics.velocity(self.body)?.speed();
        let reading = sensors.sense(&pose, physics)?;
        let inputs = reading.with_speed(sensors.normalize_speed(speed));
        self.controller.compute_controls(&inputs)
    }

    /// Command for the physics body given this tick's controls.
    pub fn drive_command(&self, controls: &ControlVector) -> DriveCommand {
        if self.is_terminal() {
            DriveCommand::idle()
        } else {
            controls.to_drive()
        }
    }

    /// Apply a contact reported by the physics step. `speed` is the
    /// body's speed when the contact was reported.
    pub fn handle_contact(&mut self, kind: ContactKind, speed: f64, rules: &RaceRules) -> ContactOutcome {
        if self.is_terminal() {
            return ContactOutcome::Ignored;
        }
        match kind {
            ContactKind::Checkpoint(index) => {
                if self.checkpoints.record_hit(index, self.race_time) {
                    ContactOutcome::CheckpointHit {
                        index,
                        time: self.race_time,
                    }
                } else {
                    ContactOutcome::Ignored
                }
            }
            ContactKind::Finish => {
                if !self.checkpoints.all_hit() {
                    return ContactOutcome::Ignored;
                }
                self.status = AgentStatus::Finished;
                self.finish_time = Some(self.race_time);
                debug!(agent = self.number(), time = self.race_time, "racer finished");
                ContactOutcome::Finished { time: self.race_time }
            }
            ContactKind::Wall => {
                if speed <= rules.wall_speed_threshold {
                    return ContactOutcome::Ignored;
                }
                self.wall_hits += 1;
                if rules.eliminate_on_wall {
                    self.status = AgentStatus::Eliminated;
                    debug!(agent = self.number(), speed, "racer eliminated on wall");
                }
                ContactOutcome::WallHit {
                    eliminated: rules.eliminate_on_wall,
                }
            }
            ContactKind::Start => ContactOutcome::Ignored,
        }
    }

    /// Finish time the first time it is asked for after finishing; `None`
    /// on every later call.
    pub fn take_unreported_finish(&mut self) -> Option<f64> {
        if self.score_reported {
            return None;
        }
        let time = self.finish_time?;
        self.score_reported = true;
        Some(time)
    }

    /// Distance from `position` to the next checkpoint, or to the finish
    /// once every checkpoint is hit.
    pub fn distance_to_next<T: Track + ?Sized>(&self, position: Point, track: &T) -> f64 {
        let target = self
            .checkpoints
            .next_target()
            .and_then(|i| track.checkpoint_position(i))
            .unwrap_or_else(|| track.finish_position());
        position.distance_to(&target)
    }

    /// Live fitness at `position`.
    pub fn fitness<T: Track + ?Sized>(&self, position: Point, track: &T, weights: &FitnessWeights) -> f64 {
        weights.score(
            self.checkpoints.hit_count(),
            self.wall_hits,
            self.distance_to_next(position, track),
        )
    }
}
