//! Controllers - who is driving.
//!
//! A controller maps sensor inputs to a [`ControlVector`] once per tick.
//! Two kinds exist: a human reading held keys, and a neural network
//! driven by a [`Genome`]. Both are pure functions of their state and
//! inputs.

use crate::genome::Genome;
use evodrive_core::error::{RaceError, Result};
use evodrive_core::types::ControlVector;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// How neural outputs become control magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Outputs above 0.5 read as 1, everything else as 0.
    #[default]
    Binary,
    /// Sigmoid outputs pass through as magnitudes.
    Analog,
}

/// Threshold used by [`OutputMode::Binary`].
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub output_mode: OutputMode,
}

/// Keys a human driver can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    fn bit(self) -> u8 {
        match self {
            Key::Up => 0b0001,
            Key::Down => 0b0010,
            Key::Left => 0b0100,
            Key::Right => 0b1000,
        }
    }
}

/// Shared held-key bitset.
///
/// The input layer owns one clone and flips bits as keys go down and up;
/// the controller owns another and reads it each tick.
#[derive(Debug, Clone, Default)]
pub struct KeyState(Arc<AtomicU8>);

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, key: Key) {
        self.0.fetch_or(key.bit(), Ordering::Relaxed);
    }

    pub fn release(&self, key: Key) {
        self.0.fetch_and(!key.bit(), Ordering::Relaxed);
    }

    pub fn release_all(&self) {
        self.0.store(0, Ordering::Relaxed);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.0.load(Ordering::Relaxed) & key.bit() != 0
    }
}

/// Keyboard driver. Held keys map straight to magnitude 1.
#[derive(Debug, Clone, Default)]
pub struct HumanController {
    keys: KeyState,
}

impl HumanController {
    pub fn new(keys: KeyState) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn compute_controls(&self) -> ControlVector {
        let held = |key| if self.keys.is_down(key) { 1.0 } else { 0.0 };
        ControlVector {
            left: held(Key::Left),
            right: held(Key::Right),
            up: held(Key::Up),
            down: held(Key::Down),
        }
    }
}

/// Genome-driven driver.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralController {
    genome: Genome,
    mode: OutputMode,
}

impl NeuralController {
    /// Wrap a genome. Its output layer must produce one value per control channel.
    pub fn new(genome: Genome, mode: OutputMode) -> Result<Self> {
        let outputs = genome.shape().output;
        if outputs != ControlVector::CHANNELS {
            return Err(RaceError::shape_mismatch("controller outputs", ControlVector::CHANNELS, outputs));
        }
        Ok(Self { genome, mode })
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn into_genome(self) -> Genome {
        self.genome
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// `inputs` is the sensor reading followed by normalized speed.
    pub fn compute_controls(&self, inputs: &[f64]) -> Result<ControlVector> {
        let outputs = self.genome.forward(inputs)?;
        let outputs: Vec<f64> = match self.mode {
            OutputMode::Analog => outputs,
            OutputMode::Binary => outputs
                .into_iter()
                .map(|v| if v > BINARY_THRESHOLD { 1.0 } else { 0.0 })
                .collect(),
        };
        Ok(ControlVector::from_outputs(&outputs))
    }
}

/// Either kind of driver.
#[derive(Debug, Clone)]
pub enum Controller {
    Human(HumanController),
    Neural(NeuralController),
}

impl Controller {
    /// Map inputs to controls. Human drivers ignore `inputs`.
    pub fn compute_controls(&self, inputs: &[f64]) -> Result<ControlVector> {
        match self {
            Controller::Human(human) => Ok(human.compute_controls()),
            Controller::Neural(neural) => neural.compute_controls(inputs),
        }
    }

    pub fn genome(&self) -> Option<&Genome> {
        match self {
            Controller::Human(_) => None,
            Controller::Neural(neural) => Some(neural.genome()),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Controller::Human(_))
    }
}

impl From<HumanController> for Controller {
    fn from(c: HumanController) -> Self {
        Controller::Human(c)
    }
}

impl From<NeuralController> for Controller {
    fn from(c: NeuralController) -> Self {
        Controller::Neural(c)
    }
}
