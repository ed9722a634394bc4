//! Sensor array - ray casts turned into controller inputs.
//!
//! Rays fan out from the vehicle's heading, evenly spaced across
//! `spread_degrees` and starting at `deviation_degrees`. Ray `i` sits at
//! `deviation + i * step` with `step = spread / (count - 1)`, so the order
//! of readings is fixed by ray index and stays stable across ticks.

use evodrive_core::error::{RaceError, Result};
use evodrive_core::physics::{LayerMask, Physics};
use evodrive_core::types::Pose;
use serde::{Deserialize, Serialize};

/// Ray layout of a sensor array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Number of rays.
    pub ray_count: usize,
    /// Total angle covered by the fan, in degrees.
    pub spread_degrees: f64,
    /// Angle of the first ray relative to the heading, in degrees.
    pub deviation_degrees: f64,
    /// Length of every ray in track units.
    pub ray_length: f64,
    /// Speed that maps to a normalized speed input of 1.0.
    pub max_speed: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ray_count: 5,
            spread_degrees: 120.0,
            deviation_degrees: -60.0,
            ray_length: 30.0,
            max_speed: 10.0,
        }
    }
}

impl SensorConfig {
    /// Genome input width for this layout: one per ray plus speed.
    pub fn input_size(&self) -> usize {
        self.ray_count + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.ray_count == 0 {
            return Err(RaceError::invalid_config("sensor.ray_count", "0", "at least one ray is required"));
        }
        if !(self.ray_length > 0.0) {
            return Err(RaceError::invalid_config(
                "sensor.ray_length",
                self.ray_length.to_string(),
                "must be positive",
            ));
        }
        if !(self.max_speed > 0.0) {
            return Err(RaceError::invalid_config(
                "sensor.max_speed",
                self.max_speed.to_string(),
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Ordered ray fractions in [0, 1]. 1.0 means nothing within ray length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading(pub Vec<f64>);

impl SensorReading {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Controller input: the ray fractions followed by `normalized_speed`.
    pub fn with_speed(&self, normalized_speed: f64) -> Vec<f64> {
        let mut inputs = Vec::with_capacity(self.0.len() + 1);
        inputs.extend_from_slice(&self.0);
        inputs.push(normalized_speed);
        inputs
    }
}

/// Casts the configured ray fan against the wall layer.
#[derive(Debug, Clone)]
pub struct SensorArray {
    config: SensorConfig,
}

impl SensorArray {
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Heading-relative angle of each ray, in radians, in reading order.
    pub fn ray_angles(&self) -> Vec<f64> {
        let count = self.config.ray_count;
        let step = if count > 1 {
            self.config.spread_degrees / (count - 1) as f64
        } else {
            0.0
        };
        (0..count)
            .map(|i| (self.config.deviation_degrees + i as f64 * step).to_radians())
            .collect()
    }

    /// Read every ray from `pose`. Only walls occlude.
    pub fn sense<P: Physics + ?Sized>(&self, pose: &Pose, physics: &P) -> Result<SensorReading> {
        let origin = pose.position();
        let readings = self
            .ray_angles()
            .into_iter()
            .map(|offset| {
                physics
                    .cast_ray(origin, pose.angle + offset, self.config.ray_length, LayerMask::WALLS)
                    .map(|fraction| fraction.clamp(0.0, 1.0))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SensorReading(readings))
    }

    /// Speed scaled into [0, 1] by the configured maximum.
    pub fn normalize_speed(&self, speed: f64) -> f64 {
        (speed / self.config.max_speed).clamp(0.0, 1.0)
    }
}
