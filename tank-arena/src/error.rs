/// Error types for the tank-arena library
use thiserror::Error;

use crate::types::SlotColor;

/// Result type alias for arena operations
pub type Result<T> = std::result::Result<T, TankError>;

/// Errors that can occur while wiring or running a tank match
#[derive(Debug, Error)]
pub enum TankError {
    /// Zenoh-related errors
    #[error("Zenoh error: {0}")]
    Zenoh(#[from] zenoh::Error),

    /// Invalid participant name provided
    #[error("Invalid participant name: {0}. Must be a valid single-chunk keyexpr (no /, *, $, ?, #, @)")]
    InvalidParticipantName(String),

    /// Invalid keyexpr pattern
    #[error("Invalid keyexpr: {0}")]
    InvalidKeyexpr(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A required collaborator was never supplied to the game builder
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A phase needed the slot's avatar but none is spawned
    #[error("Slot {0} has no spawned avatar")]
    MissingAvatar(SlotColor),

    /// Avatar spawner failed
    #[error("Spawn error: {0}")]
    Spawn(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
