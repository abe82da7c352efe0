//! Fixed-capacity table of two-party Peterson locks.
//!
//! Every lock lives in a slot of a [`LockTable`] and is addressed by an
//! opaque [`LockId`]. Callers never touch slot state directly; the four
//! operations are the only way in:
//!
//! - [`LockTable::create`] claims a free slot with a single compare-and-swap
//! - [`LockTable::acquire`] runs Peterson's entry protocol for one role,
//!   yielding to the [`Scheduler`] while the other role has priority
//! - [`LockTable::release`] withdraws one role's intent
//! - [`LockTable::destroy`] frees the slot and cancels any waiter
//!
//! Mutual exclusion holds for exactly two contenders using opposite roles
//! on the same lock. Nothing stops misuse (two callers sharing a role), and
//! nothing orders unrelated locks.
//!
//! [`LockId`]: pairlock_types::LockId
//! [`Scheduler`]: pairlock_core::Scheduler

mod config;
mod error;
mod slot;
mod table;

pub use config::LockTableConfig;
pub use error::LockError;
pub use table::LockTable;
