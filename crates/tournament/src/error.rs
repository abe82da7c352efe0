//! Error types for the tournament coordinator.

use pairlock_core::SpawnError;
use pairlock_table::LockError;
use pairlock_types::{LockId, ParticipantIndex, Role};
use thiserror::Error;

/// Errors from tournament setup, acquire and release.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Participant count is zero, not a power of two, or over the limit.
    #[error("Invalid participant count {count}: must be a power of two no greater than {max}")]
    InvalidCount {
        /// Requested count.
        count: usize,
        /// Configured limit.
        max: usize,
    },

    /// Participant index outside `0..count`.
    #[error("{index} out of range for a {count}-way tournament")]
    InvalidParticipant {
        /// Requested index.
        index: ParticipantIndex,
        /// Participants in the tree.
        count: usize,
    },

    /// The lock table could not supply every lock of the tree.
    #[error("Not enough free locks: {0}")]
    NoCapacity(#[source] LockError),

    /// A participant could not be started.
    #[error("Participant spawn failed: {0}")]
    Spawn(#[from] SpawnError),

    /// No tournament exists for the caller.
    #[error("No tournament set up")]
    NotSetUp,

    /// The participant already holds the tournament lock.
    #[error("{0} already holds the tournament lock")]
    AlreadyHeld(ParticipantIndex),

    /// An underlying lock operation failed during acquire or release.
    #[error("Lock operation on {lock} as {role} failed: {source}")]
    LockFailure {
        /// Lock that failed.
        lock: LockId,
        /// Role used on that lock.
        role: Role,
        /// Table error.
        source: LockError,
    },

    /// A lock could not be destroyed during teardown.
    #[error("Failed to destroy {lock}: {source}")]
    Teardown {
        /// Lock that failed.
        lock: LockId,
        /// Table error.
        source: LockError,
    },
}
