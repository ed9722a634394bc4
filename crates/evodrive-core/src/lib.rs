//! # Evodrive Core
//!
//! Core types and collaborator traits shared by every evodrive crate.
//!
//! The core of evodrive is the evolutionary training loop. Everything it
//! does not own is reached through two narrow traits defined here:
//!
//! - **Physics** - vehicle dynamics, ray casting and contact events
//! - **Track** - checkpoint layout and the finish line
//!
//! Along with those traits this crate defines the shared value types
//! (poses, velocities, control vectors, drive commands) and the error
//! taxonomy used across the workspace.
//!
//! ## Quick Start
//!
//! ```rust
//! use evodrive_core::prelude::*;
//!
//! let pose = Pose::new(0.0, 0.0, 0.0);
//! let controls = ControlVector::from_outputs(&[1.0, 0.0, 0.0, 0.0]);
//! assert_eq!(controls.up, 1.0);
//! assert_eq!(pose.position(), Point::new(0.0, 0.0));
//! ```

pub mod types;
pub mod physics;
pub mod track;
pub mod error;
pub mod prelude;
