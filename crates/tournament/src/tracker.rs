//! Tracker for the locks a participant currently holds.

use pairlock_types::{LockId, Role};

/// Stack of `(lock, role)` pairs held by one participant.
///
/// Entries are pushed leaf first while acquiring, so the top of the stack is
/// always the lock closest to the root. Release pops from the top, which
/// gives root-to-leaf order for free.
#[derive(Debug, Default, Clone)]
pub struct HeldLocks {
    stack: Vec<(LockId, Role)>,
    depth: usize,
}

impl HeldLocks {
    /// Create an empty tracker for a tree with `depth` levels.
    pub fn new(depth: usize) -> Self {
        Self {
            stack: Vec::with_capacity(depth),
            depth,
        }
    }

    /// Record a newly acquired lock.
    ///
    /// The stack never grows past one entry per tree level.
    pub fn push(&mut self, lock: LockId, role: Role) {
        debug_assert!(
            self.stack.len() < self.depth,
            "held more locks than tree levels"
        );
        self.stack.push((lock, role));
    }

    /// The most recently acquired lock, nearest the root.
    pub fn top(&self) -> Option<(LockId, Role)> {
        self.stack.last().copied()
    }

    /// Forget the most recently acquired lock.
    pub fn pop(&mut self) -> Option<(LockId, Role)> {
        self.stack.pop()
    }

    /// Held entries in acquisition order (leaf first).
    pub fn iter(&self) -> impl Iterator<Item = &(LockId, Role)> {
        self.stack.iter()
    }

    /// Number of held locks.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Check if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
