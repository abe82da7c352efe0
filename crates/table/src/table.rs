//! The lock table and its four operations.

use crate::slot::LockSlot;
use crate::{LockError, LockTableConfig};
use pairlock_core::{Scheduler, ThreadScheduler};
use pairlock_types::{LockId, Role};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, trace, warn};

static GLOBAL: OnceLock<Arc<LockTable>> = OnceLock::new();

/// Fixed-capacity registry of two-party locks.
///
/// All slot state is owned here. Slots are claimed lock-free, so the table
/// needs no higher-level lock to protect its own allocation.
pub struct LockTable {
    slots: Box<[LockSlot]>,
    scheduler: Arc<dyn Scheduler>,
}

impl LockTable {
    /// Create a table whose waiters yield the OS thread.
    pub fn new(config: LockTableConfig) -> Self {
        Self::with_scheduler(config, Arc::new(ThreadScheduler))
    }

    /// Create a table whose waiters yield through `scheduler`.
    pub fn with_scheduler(config: LockTableConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let slots = (0..config.capacity).map(|_| LockSlot::new()).collect();
        Self { slots, scheduler }
    }

    /// Install the process-wide table.
    ///
    /// Returns false if the table was already initialised, in which case
    /// `config` is ignored. There is no teardown.
    pub fn init_global(config: LockTableConfig) -> bool {
        let mut installed = false;
        GLOBAL.get_or_init(|| {
            installed = true;
            info!(capacity = config.capacity, "Initialising process-wide lock table");
            Arc::new(LockTable::new(config))
        });
        installed
    }

    /// The process-wide table, initialised with defaults on first use.
    pub fn global() -> &'static Arc<LockTable> {
        GLOBAL.get_or_init(|| {
            let config = LockTableConfig::default();
            info!(capacity = config.capacity, "Initialising process-wide lock table");
            Arc::new(LockTable::new(config))
        })
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently active.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    /// Check if `id` names an active slot.
    pub fn is_active(&self, id: LockId) -> bool {
        self.slots.get(id.index()).is_some_and(LockSlot::is_active)
    }

    /// Claim the lowest free slot.
    ///
    /// The returned lock starts with neither role holding or waiting.
    ///
    /// # Errors
    ///
    /// [`LockError::NoCapacity`] if every slot is active.
    pub fn create(&self) -> Result<LockId, LockError> {
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.try_claim() {
                let id = LockId(index);
                debug!(lock = %id, "Created lock");
                return Ok(id);
            }
        }

        warn!(capacity = self.capacity(), "Lock table exhausted");
        Err(LockError::NoCapacity {
            capacity: self.capacity(),
        })
    }

    /// Enter the critical section guarded by `id` as `role`.
    ///
    /// Blocks (yielding) while the other role has announced intent and it is
    /// its turn. On success the caller is inside the critical section until it
    /// calls [`release`](Self::release) with the same role.
    ///
    /// # Errors
    ///
    /// - [`LockError::InvalidArgument`] if `id` is outside the table
    /// - [`LockError::Inactive`] if the lock does not exist
    /// - [`LockError::Destroyed`] if the lock was destroyed while waiting
    pub fn acquire(&self, id: LockId, role: Role) -> Result<(), LockError> {
        let slot = self.slot(id)?;
        let generation = slot.enter().ok_or(LockError::Inactive(id))?;

        if !slot.announce(role, generation) {
            return Err(cancelled(slot, id, role, generation, 0));
        }

        let mut yields = 0u64;
        while slot.must_wait(role, generation) {
            self.scheduler.yield_now();
            yields += 1;

            if !slot.is_live(generation) {
                return Err(cancelled(slot, id, role, generation, yields));
            }
            trace!(lock = %id, %role, yields, "Still waiting");
        }

        // Destroy clears both flags, which also ends the loop above.
        if !slot.is_live(generation) {
            return Err(cancelled(slot, id, role, generation, yields));
        }

        trace!(lock = %id, %role, yields, "Acquired lock");
        Ok(())
    }

    /// Leave the critical section guarded by `id` as `role`.
    ///
    /// Releasing a role that holds nothing is not an error.
    ///
    /// # Errors
    ///
    /// - [`LockError::InvalidArgument`] if `id` is outside the table
    /// - [`LockError::Inactive`] if the lock does not exist
    pub fn release(&self, id: LockId, role: Role) -> Result<(), LockError> {
        let slot = self.slot(id)?;
        let generation = slot.enter().ok_or(LockError::Inactive(id))?;

        slot.withdraw(role, generation);
        trace!(lock = %id, %role, "Released lock");
        Ok(())
    }

    /// Free the slot behind `id` for reuse.
    ///
    /// Only call this once no participant is, or will be, inside the
    /// critical section. Participants still waiting on the lock fail with
    /// [`LockError::Destroyed`].
    ///
    /// # Errors
    ///
    /// - [`LockError::InvalidArgument`] if `id` is outside the table
    /// - [`LockError::Inactive`] if the lock does not exist
    pub fn destroy(&self, id: LockId) -> Result<(), LockError> {
        let slot = self.slot(id)?;
        if !slot.retire() {
            return Err(LockError::Inactive(id));
        }

        debug!(lock = %id, "Destroyed lock");
        Ok(())
    }

    fn slot(&self, id: LockId) -> Result<&LockSlot, LockError> {
        self.slots.get(id.index()).ok_or_else(|| {
            LockError::InvalidArgument(format!(
                "{} out of range (capacity {})",
                id,
                self.capacity()
            ))
        })
    }
}

fn cancelled(slot: &LockSlot, id: LockId, role: Role, generation: u64, yields: u64) -> LockError {
    slot.withdraw(role, generation);
    warn!(lock = %id, %role, yields, "Lock destroyed while waiting");
    LockError::Destroyed(id)
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new(LockTableConfig::default())
    }
}

impl fmt::Debug for LockTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockTable")
            .field("capacity", &self.capacity())
            .field("active", &self.active_count())
            .finish()
    }
}
