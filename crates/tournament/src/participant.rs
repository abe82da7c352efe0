//! Per-participant tournament handle.

use crate::tree::{path, PathStep};
use crate::{HeldLocks, TournamentError, TournamentTree};
use pairlock_types::ParticipantIndex;
use tracing::{debug, trace, warn};

/// One participant's view of a tournament.
///
/// Owned by exactly one execution unit. The tree is shared read-only; the
/// held-lock stack is private to this handle.
#[derive(Debug)]
pub struct Tournament {
    tree: TournamentTree,
    index: ParticipantIndex,
    path: Vec<PathStep>,
    held: HeldLocks,
}

impl Tournament {
    pub(crate) fn new(tree: TournamentTree, index: ParticipantIndex) -> Self {
        let levels = tree.levels();
        Self {
            path: path(index.get(), levels),
            held: HeldLocks::new(levels as usize),
            tree,
            index,
        }
    }

    /// Enter the tournament's critical section.
    ///
    /// Wins one two-party lock per level, leaf first. If any level fails,
    /// everything already won is released before returning.
    ///
    /// # Errors
    ///
    /// - [`TournamentError::AlreadyHeld`] if this participant is already
    ///   inside (locking is not reentrant)
    /// - [`TournamentError::LockFailure`] if a lock operation failed
    pub fn acquire(&mut self) -> Result<(), TournamentError> {
        if !self.held.is_empty() {
            return Err(TournamentError::AlreadyHeld(self.index));
        }

        for i in 0..self.path.len() {
            let step = self.path[i];
            let lock = self.tree.locks()[step.node];
            if let Err(source) = self.tree.table().acquire(lock, step.role) {
                warn!(
                    participant = %self.index,
                    %lock,
                    role = %step.role,
                    level = step.level,
                    error = %source,
                    "Tournament acquire failed, unwinding"
                );
                // Unwind failures are already logged; the acquire error is
                // the one the caller needs.
                let _ = self.release();
                return Err(TournamentError::LockFailure {
                    lock,
                    role: step.role,
                    source,
                });
            }
            trace!(participant = %self.index, %lock, level = step.level, "Won level");
            self.held.push(lock, step.role);
        }

        debug!(participant = %self.index, "Entered critical section");
        Ok(())
    }

    /// Leave the critical section.
    ///
    /// Releases held locks root first. Stops at the first failure, leaving
    /// that lock and everything below it recorded as held.
    ///
    /// # Errors
    ///
    /// [`TournamentError::LockFailure`] if a lock could not be released.
    pub fn release(&mut self) -> Result<(), TournamentError> {
        while let Some((lock, role)) = self.held.top() {
            if let Err(source) = self.tree.table().release(lock, role) {
                warn!(
                    participant = %self.index,
                    %lock,
                    %role,
                    still_held = self.held.len(),
                    error = %source,
                    "Tournament release failed"
                );
                return Err(TournamentError::LockFailure { lock, role, source });
            }
            self.held.pop();
        }

        trace!(participant = %self.index, "Left critical section");
        Ok(())
    }

    /// This participant's index.
    pub fn index(&self) -> ParticipantIndex {
        self.index
    }

    /// Participants in the tournament.
    pub fn participants(&self) -> usize {
        self.tree.participants()
    }

    /// Tree levels, which is also the number of locks held while inside.
    pub fn levels(&self) -> u32 {
        self.tree.levels()
    }

    /// The `(node, role)` steps this participant takes, leaf first.
    pub fn path(&self) -> &[PathStep] {
        &self.path
    }

    /// Locks currently held.
    pub fn held(&self) -> &HeldLocks {
        &self.held
    }

    /// The shared tree this participant belongs to.
    pub fn tree(&self) -> &TournamentTree {
        &self.tree
    }
}
