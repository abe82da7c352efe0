//! Capability traits and their thread-backed implementations.

use crate::SpawnError;
use pairlock_types::ParticipantIndex;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Cooperative yield.
///
/// Called from inside a lock's wait loop. Implementations relinquish the
/// processor without releasing any lock state and make no promise about
/// which unit runs next or for how long.
///
/// # Example
///
/// ```ignore
/// struct CountingScheduler(AtomicUsize);
///
/// impl Scheduler for CountingScheduler {
///     fn yield_now(&self) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///         std::thread::yield_now();
///     }
/// }
/// ```
pub trait Scheduler: Send + Sync {
    /// Give up the processor, resuming at some later point.
    fn yield_now(&self);
}

/// Yields the current OS thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn yield_now(&self) {
        thread::yield_now();
    }
}

/// Work run by a freshly started participant.
pub type ParticipantBody = Box<dyn FnOnce() + Send + 'static>;

/// Participant duplication.
///
/// Starts one additional execution unit for `index`. The new unit runs
/// `body`, which owns everything the participant needs; nothing is shared
/// with the caller except what `body` captured.
pub trait Spawner {
    /// Handle the caller can use to wait for the spawned unit.
    type Handle;

    /// Start a unit for `index` running `body`.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Failed`] if the unit could not be started. No
    /// retry is attempted.
    fn spawn(
        &self,
        index: ParticipantIndex,
        body: ParticipantBody,
    ) -> Result<Self::Handle, SpawnError>;
}

/// Spawns each participant on its own named OS thread.
#[derive(Debug, Clone)]
pub struct ThreadSpawner {
    name_prefix: String,
}

impl ThreadSpawner {
    /// Create a spawner whose threads are named `{prefix}-{index}`.
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
        }
    }
}

impl Default for ThreadSpawner {
    fn default() -> Self {
        Self::new("participant")
    }
}

impl Spawner for ThreadSpawner {
    type Handle = JoinHandle<()>;

    fn spawn(
        &self,
        index: ParticipantIndex,
        body: ParticipantBody,
    ) -> Result<Self::Handle, SpawnError> {
        let name = format!("{}-{}", self.name_prefix, index.get());
        debug!(%index, thread = %name, "Spawning participant thread");

        thread::Builder::new()
            .name(name)
            .spawn(body)
            .map_err(|e| SpawnError::Failed {
                index,
                reason: e.to_string(),
            })
    }
}
