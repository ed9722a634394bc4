//! Circuit - a ring-shaped kinematic track.
//!
//! Cars drive counter-clockwise between an inner and an outer circular
//! wall centered on the origin. Checkpoints are radial gates at evenly
//! spaced angles; the finish gate sits at the start angle and counts once
//! a car has come all the way round. Motion is simple kinematics: no mass,
//! no tyre model, and a wall contact only pushes the car back inside.

use evodrive_core::error::{RaceError, Result};
use evodrive_core::physics::{Contact, ContactKind, LayerMask, Physics};
use evodrive_core::track::Track;
use evodrive_core::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Geometry and handling of a [`Circuit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Used to key persisted evolution state.
    pub name: String,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub checkpoints: usize,
    pub vehicle_radius: f64,
    pub max_speed: f64,
    /// Forward acceleration at full throttle, units/s².
    pub acceleration: f64,
    /// Deceleration at full brake, units/s².
    pub braking: f64,
    /// Fraction of speed lost per second when coasting.
    pub drag: f64,
    /// Heading change at full steer, rad/s.
    pub turn_rate: f64,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            name: "ring".to_string(),
            inner_radius: 60.0,
            outer_radius: 100.0,
            checkpoints: 4,
            vehicle_radius: 2.0,
            max_speed: 10.0,
            acceleration: 6.0,
            braking: 12.0,
            drag: 0.5,
            turn_rate: 2.5,
        }
    }
}

impl CircuitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.inner_radius > 0.0) || !(self.outer_radius > self.inner_radius + 2.0 * self.vehicle_radius) {
            return Err(RaceError::invalid_config(
                "circuit.radii",
                format!("{}..{}", self.inner_radius, self.outer_radius),
                "outer radius must exceed inner radius by more than a car width",
            ));
        }
        if !(self.max_speed > 0.0) {
            return Err(RaceError::invalid_config("circuit.max_speed", self.max_speed.to_string(), "must be positive"));
        }
        Ok(())
    }

    fn mid_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    /// Angular position of checkpoint `index` (unwrapped, in (0, TAU)).
    fn checkpoint_angle(&self, index: usize) -> f64 {
        TAU * (index + 1) as f64 / (self.checkpoints + 1) as f64
    }
}

#[derive(Debug, Clone)]
struct Vehicle {
    x: f64,
    y: f64,
    heading: f64,
    speed: f64,
    omega: f64,
    command: DriveCommand,
    /// Unwrapped angle travelled around the ring since spawn.
    progress: f64,
    touching_wall: bool,
}

impl Vehicle {
    fn polar_angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

/// Ring track plus the cars on it.
#[derive(Debug, Clone)]
pub struct Circuit {
    config: CircuitConfig,
    vehicles: BTreeMap<BodyId, Vehicle>,
    next_body: u32,
}

impl Circuit {
    pub fn new(config: CircuitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            vehicles: BTreeMap::new(),
            next_body: 0,
        })
    }

    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    fn vehicle(&self, body: BodyId) -> Result<&Vehicle> {
        self.vehicles.get(&body).ok_or(RaceError::unknown_body(body.0))
    }

    fn vehicle_mut(&mut self, body: BodyId) -> Result<&mut Vehicle> {
        self.vehicles.get_mut(&body).ok_or(RaceError::unknown_body(body.0))
    }

    /// Distance along the ray to the first crossing of a circle of `radius`.
    fn ray_circle(origin: Point, dx: f64, dy: f64, radius: f64) -> Option<f64> {
        // |o + t d|² = r², with |d| = 1
        let b = origin.x * dx + origin.y * dy;
        let c = origin.x * origin.x + origin.y * origin.y - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        [-b - root, -b + root].into_iter().find(|t| *t > 1e-9)
    }
}

impl Track for Circuit {
    fn checkpoint_count(&self) -> usize {
        self.config.checkpoints
    }

    fn checkpoint_position(&self, index: usize) -> Option<Point> {
        if index >= self.config.checkpoints {
            return None;
        }
        let angle = self.config.checkpoint_angle(index);
        let r = self.config.mid_radius();
        Some(Point::new(r * angle.cos(), r * angle.sin()))
    }

    fn finish_position(&self) -> Point {
        Point::new(self.config.mid_radius(), 0.0)
    }

    fn track_id(&self) -> Option<String> {
        Some(self.config.name.clone())
    }
}

impl Physics for Circuit {
    fn spawn_vehicle(&mut self) -> BodyId {
        let body = BodyId(self.next_body);
        self.next_body += 1;
        self.vehicles.insert(
            body,
            Vehicle {
                x: self.config.mid_radius(),
                y: 0.0,
                heading: FRAC_PI_2,
                speed: 0.0,
                omega: 0.0,
                command: DriveCommand::idle(),
                progress: 0.0,
                touching_wall: false,
            },
        );
        body
    }

    fn remove_vehicle(&mut self, body: BodyId) {
        self.vehicles.remove(&body);
    }

    fn step_world(&mut self, dt: f64) -> Vec<Contact> {
        let cfg = &self.config;
        let mut contacts = Vec::new();

        for (&body, v) in self.vehicles.iter_mut() {
            let cmd = v.command;
            let accel = cmd.throttle * cfg.acceleration - cmd.brake * cfg.braking - cfg.drag * v.speed;
            v.speed = (v.speed + accel * dt).clamp(0.0, cfg.max_speed);
            // Negative steer turns left, which is counter-clockwise here.
            v.omega = if v.speed > 0.05 { -cmd.steer * cfg.turn_rate } else { 0.0 };
            v.heading += v.omega * dt;

            let before = v.polar_angle();
            v.x += v.heading.cos() * v.speed * dt;
            v.y += v.heading.sin() * v.speed * dt;

            let mut swept = v.polar_angle() - before;
            if swept > PI {
                swept -= TAU;
            } else if swept < -PI {
                swept += TAU;
            }
            let (from, to) = (v.progress, v.progress + swept);
            v.progress = to;

            if to > from {
                for index in 0..cfg.checkpoints {
                    let base = cfg.checkpoint_angle(index);
                    if crosses_lap_gate(from, to, base) {
                        contacts.push(Contact::new(body, ContactKind::Checkpoint(index)));
                    }
                }
                if crosses_lap_gate(from, to, TAU) {
                    contacts.push(Contact::new(body, ContactKind::Finish));
                }
            } else if from > 0.0 && to <= 0.0 {
                contacts.push(Contact::new(body, ContactKind::Start));
            }

            let r = (v.x * v.x + v.y * v.y).sqrt();
            let lo = cfg.inner_radius + cfg.vehicle_radius;
            let hi = cfg.outer_radius - cfg.vehicle_radius;
            let in_wall = r < lo || r > hi;
            if in_wall {
                if !v.touching_wall {
                    contacts.push(Contact::new(body, ContactKind::Wall));
                }
                let clamped = r.clamp(lo, hi);
                let scale = if r > 0.0 { clamped / r } else { 1.0 };
                v.x *= scale;
                v.y *= scale;
            }
            v.touching_wall = in_wall;
        }
        contacts
    }

    fn pose(&self, body: BodyId) -> Result<Pose> {
        let v = self.vehicle(body)?;
        Ok(Pose::new(v.x, v.y, v.heading))
    }

    fn velocity(&self, body: BodyId) -> Result<Velocity> {
        let v = self.vehicle(body)?;
        Ok(Velocity::new(v.heading.cos() * v.speed, v.heading.sin() * v.speed, v.omega))
    }

    fn cast_ray(&self, origin: Point, angle: f64, max_len: f64, mask: LayerMask) -> Result<f64> {
        if !mask.contains(LayerMask::WALLS) || max_len <= 0.0 {
            return Ok(1.0);
        }
        let (dx, dy) = (angle.cos(), angle.sin());
        let hit = [self.config.inner_radius, self.config.outer_radius]
            .into_iter()
            .filter_map(|radius| Self::ray_circle(origin, dx, dy, radius))
            .fold(f64::INFINITY, f64::min);
        Ok((hit / max_len).min(1.0))
    }

    fn apply_controls(&mut self, body: BodyId, command: DriveCommand) -> Result<()> {
        self.vehicle_mut(body)?.command = command;
        Ok(())
    }

    fn damp_velocity(&mut self, body: BodyId, factor: f64) -> Result<()> {
        let v = self.vehicle_mut(body)?;
        v.speed *= factor;
        v.omega *= factor;
        Ok(())
    }
}

/// Whether forward motion from `from` to `to` passes `base` on any lap.
fn crosses_lap_gate(from: f64, to: f64, base: f64) -> bool {
    let laps = ((to - base) / TAU).floor();
    let gate = base + laps * TAU;
    from < gate && gate <= to
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit() -> Circuit {
        Circuit::new(CircuitConfig::default()).unwrap()
    }

    #[test]
    fn rays_see_walls_from_the_middle() {
        let c = circuit();
        let origin = Point::new(80.0, 0.0);
        // straight out: outer wall 20 away
        let out = c.cast_ray(origin, 0.0, 30.0, LayerMask::WALLS).unwrap();
        assert!((out - 20.0 / 30.0).abs() < 1e-9);
        // straight in: inner wall 20 away
        let inward = c.cast_ray(origin, PI, 30.0, LayerMask::WALLS).unwrap();
        assert!((inward - 20.0 / 30.0).abs() < 1e-9);
        // along the track nothing within 30
        let along = c.cast_ray(origin, FRAC_PI_2, 30.0, LayerMask::WALLS).unwrap();
        assert_eq!(along, 1.0);
    }

    #[test]
    fn rays_ignore_non_wall_layers() {
        let c = circuit();
        let f = c.cast_ray(Point::new(80.0, 0.0), 0.0, 30.0, LayerMask::CHECKPOINTS).unwrap();
        assert_eq!(f, 1.0);
    }

    #[test]
    fn idle_car_stays_put() {
        let mut c = circuit();
        let body = c.spawn_vehicle();
        for _ in 0..10 {
            assert!(c.step_world(1.0 / 60.0).is_empty());
        }
        assert_eq!(c.pose(body).unwrap().position(), Point::new(80.0, 0.0));
    }

    #[test]
    fn full_throttle_straight_hits_outer_wall() {
        let mut c = circuit();
        let body = c.spawn_vehicle();
        c.apply_controls(body, DriveCommand { steer: 0.0, throttle: 1.0, brake: 0.0 }).unwrap();
        let mut walls = 0;
        for _ in 0..60 * 20 {
            walls += c
                .step_world(1.0 / 60.0)
                .iter()
                .filter(|contact| contact.kind == ContactKind::Wall)
                .count();
        }
        assert!(walls >= 1);
        let p = c.pose(body).unwrap();
        let r = (p.x * p.x + p.y * p.y).sqrt();
        assert!(r <= 98.0 + 1e-9);
    }

    #[test]
    fn lap_gates_fire_in_order() {
        assert!(crosses_lap_gate(0.0, 1.3, 1.2));
        assert!(!crosses_lap_gate(1.2, 1.3, 1.2));
        assert!(crosses_lap_gate(TAU - 0.1, TAU + 0.1, TAU));
        assert!(crosses_lap_gate(TAU + 1.1, TAU + 1.3, 1.2));
    }

    #[test]
    fn checkpoints_sit_on_the_centre_line() {
        let c = circuit();
        assert_eq!(c.checkpoint_count(), 4);
        let p = c.checkpoint_position(1).unwrap();
        assert!(((p.x * p.x + p.y * p.y).sqrt() - 80.0).abs() < 1e-9);
        assert!(c.checkpoint_position(4).is_none());
        assert_eq!(c.track_id().as_deref(), Some("ring"));
    }

    #[test]
    fn unknown_body_is_an_error() {
        let c = circuit();
        assert!(c.pose(BodyId(42)).is_err());
    }
}
