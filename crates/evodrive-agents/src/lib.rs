//! # Evodrive Agents
//!
//! Everything that lives inside one racing agent.
//!
//! - **Genome** - two-layer sigmoid network weights; clone, mutate, crossover
//! - **SensorArray** - fan of wall-only ray casts, normalized to [0, 1]
//! - **Controller** - human (held keys) or neural (genome-driven)
//! - **CheckpointState** - ordered or any-order checkpoint progress
//! - **Racer** - controller plus vehicle body plus race state machine
//!
//! Breeding helpers build a whole population of genomes from one or two
//! selected parents.

pub mod genome;
pub mod sensor;
pub mod controller;
pub mod checkpoint;
pub mod racer;
pub mod fitness;
pub mod breeding;
pub mod serialize;
pub mod prelude;
