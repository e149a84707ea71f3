//! Errors raised by the movement, zone and fog of war logic.
//!
//! Missing database records are content bugs, so they are always propagated
//! to the caller rather than defaulted.

use crate::types::{PlayerId, UnitUrn};

/// Errors returned by fallible operations in this crate.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// A referenced record id does not exist.
    #[error("{kind} \"{id}\" not found")]
    RecordNotFound { kind: &'static str, id: String },
    /// A unit owner is not in the player roster.
    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),
    /// A unit urn is not in the fog of war memory.
    #[error("Unit {0} not found")]
    UnitNotFound(UnitUrn),
    /// Database or settings JSON could not be parsed.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl MovementError {
    /// Shorthand for building a [`MovementError::RecordNotFound`].
    pub fn record_not_found(kind: &'static str, id: impl Into<String>) -> Self {
        MovementError::RecordNotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, MovementError>;
