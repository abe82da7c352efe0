//! Configuration for the lock table.

/// Configuration for a [`LockTable`](crate::LockTable).
#[derive(Debug, Clone)]
pub struct LockTableConfig {
    /// Number of slots.
    ///
    /// Fixed for the lifetime of the table. One tournament of N
    /// participants needs N - 1 slots.
    pub capacity: usize,
}

impl LockTableConfig {
    /// Enough slots for one 16-way tournament.
    pub const DEFAULT_CAPACITY: usize = 15;

    /// Create a config with a custom slot count.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Default for LockTableConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}
