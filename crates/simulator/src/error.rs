//! Simulation errors.

use pairlock_table::LockError;
use pairlock_tournament::TournamentError;
use thiserror::Error;

/// Errors that end a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A two-party lock operation failed.
    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    /// A tournament operation failed.
    #[error("Tournament error: {0}")]
    Tournament(#[from] TournamentError),

    /// A participant thread panicked.
    #[error("Participant {0} panicked")]
    Panicked(usize),

    /// Two participants were inside the critical section at once.
    #[error("Critical sections of participants {first} and {second} overlapped")]
    Overlap {
        /// Participant that entered first.
        first: usize,
        /// Participant that entered while the first was still inside.
        second: usize,
    },
}
