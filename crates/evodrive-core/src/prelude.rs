//! Evodrive Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use evodrive_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{
    AgentId, BodyId,
    Point, Pose, Velocity,
    ControlVector, DriveCommand,
    AgentStatus,
    Tick,
};

// Re-export the collaborator traits
pub use crate::physics::{Contact, ContactKind, LayerMask, Physics};
pub use crate::track::Track;

// Re-export error types
pub use crate::error::{RaceError, Result};
