//! Error types for capability providers.

use pairlock_types::ParticipantIndex;
use thiserror::Error;

/// Errors from a [`Spawner`](crate::Spawner).
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The platform refused to start another execution unit.
    #[error("Failed to spawn {index}: {reason}")]
    Failed {
        /// The participant that could not be started.
        index: ParticipantIndex,
        /// Platform-provided description.
        reason: String,
    },
}
