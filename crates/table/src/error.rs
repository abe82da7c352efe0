//! Error types for lock table operations.

use pairlock_types::LockId;
use thiserror::Error;

/// Errors from [`LockTable`](crate::LockTable) operations.
///
/// The table never retries; every error goes straight back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Lock id outside the table.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Every slot is active.
    #[error("No free lock slot (capacity {capacity})")]
    NoCapacity {
        /// Table capacity at the time of the call.
        capacity: usize,
    },

    /// The slot was never created or has already been destroyed.
    #[error("{0} is not active")]
    Inactive(LockId),

    /// The slot was destroyed while the caller was waiting for it.
    #[error("{0} was destroyed while waiting")]
    Destroyed(LockId),
}
