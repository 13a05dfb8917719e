//! Error types
//!
//! Collisions are not errors: a forward move that runs into something is
//! reported through [`crate::sim::MoveResult`] with the distance covered.

use std::path::PathBuf;

use crate::sim::ColliderKind;

/// Recoverable rejections from the robot state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// A forward or turn command arrived while another move is in flight
    #[error("Already moving")]
    AlreadyMoving,
    /// An immediate action (pick) was attempted while a move is in flight
    #[error("robot is busy with a pending move")]
    Busy,
}

/// Failures building a simulation. None of these can be recovered from.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("robot cannot be placed at ({x}, {y}): overlaps {kind}")]
    InvalidPlacement { x: f32, y: f32, kind: ColliderKind },

    #[error("could only place {placed} of {requested} rocks without overlaps")]
    RockPlacement { placed: usize, requested: usize },

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Malformed traffic on the command channel. Treated as a programming error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("malformed payload for '{tag}': {reason}")]
    MalformedPayload { tag: String, reason: String },
}

/// Failures seen by the control side of the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// The simulation side has been dropped
    #[error("simulation driver disconnected")]
    Disconnected,
    /// Only one screenshot may be outstanding at a time
    #[error("a screenshot request is already in flight")]
    ScreenshotInFlight,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
