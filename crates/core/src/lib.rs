//! Core capabilities for pairlock.
//!
//! The lock table and the tournament coordinator never create execution
//! units or talk to a scheduler directly. They consume two capabilities:
//!
//! - [`Scheduler`]: "yield now, resume later with no ordering guarantee"
//! - [`Spawner`]: "start another participant with its own private state"
//!
//! The thread-backed implementations here are what the rest of the
//! workspace uses by default. Tests substitute their own to observe or
//! perturb the wait loop.

mod error;
mod traits;

pub use error::SpawnError;
pub use traits::{ParticipantBody, Scheduler, Spawner, ThreadScheduler, ThreadSpawner};
