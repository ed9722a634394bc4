//! Error types for evodrive operations.
//!
//! Nothing in the training loop is allowed to take the process down.
//! Every failure is one of a small set of recoverable conditions that the
//! caller either reports to the operator or logs and moves past.

use thiserror::Error;

/// Result type for evodrive operations.
pub type Result<T> = std::result::Result<T, RaceError>;

/// Errors that can occur during evodrive operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RaceError {
    /// Genome or input dimensions do not line up. The operation is
    /// aborted and no genome is modified.
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// Evolution was requested with no agent selected.
    #[error("no agent selected: select at least one agent before evolving")]
    NoSelection,

    /// Undo was requested with one history entry or fewer.
    #[error("no previous evolution to undo")]
    EmptyHistory,

    /// Saving or loading evolution state failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The physics collaborator failed for a single agent.
    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<std::io::Error> for RaceError {
    fn from(e: std::io::Error) -> Self {
        RaceError::Persistence(PersistenceError::Io(e.to_string()))
    }
}

impl From<serde_json::Error> for RaceError {
    fn from(e: serde_json::Error) -> Self {
        RaceError::Persistence(PersistenceError::Serialization(e.to_string()))
    }
}

/// Persistence errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistenceError {
    /// I/O failure (wrapped).
    #[error("I/O error: {0}")]
    Io(String),
    /// JSON encoding or decoding failure.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The stored state decoded but is internally inconsistent.
    #[error("corrupt state: {0}")]
    Corrupt(String),
}

/// Physics collaborator errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// The body handle is not known to the physics world.
    #[error("unknown body: {0}")]
    UnknownBody(u32),
    /// A ray cast could not be performed.
    #[error("ray cast failed: {0}")]
    RayCast(String),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid value.
    #[error("invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

// Convenience constructors
impl RaceError {
    pub fn shape_mismatch(
        context: impl Into<String>,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        RaceError::ShapeMismatch {
            context: context.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RaceError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        RaceError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    pub fn unknown_body(id: u32) -> Self {
        RaceError::Physics(PhysicsError::UnknownBody(id))
    }

    /// Whether the operator should be told about this error rather than
    /// having it only logged.
    pub fn is_operator_facing(&self) -> bool {
        matches!(self, RaceError::NoSelection | RaceError::EmptyHistory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_message_names_both_shapes() {
        let e = RaceError::shape_mismatch("forward", 6, 4);
        assert_eq!(e.to_string(), "shape mismatch in forward: expected 6, found 4");
    }

    #[test]
    fn io_errors_become_persistence_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: RaceError = io.into();
        assert!(matches!(e, RaceError::Persistence(PersistenceError::Io(_))));
        assert!(!e.is_operator_facing());
    }

    #[test]
    fn selection_errors_are_operator_facing() {
        assert!(RaceError::NoSelection.is_operator_facing());
        assert!(RaceError::EmptyHistory.is_operator_facing());
    }
}
