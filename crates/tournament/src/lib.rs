//! Tournament-tree mutual exclusion.
//!
//! N participants (N a power of two) share one critical section using only
//! two-party locks. The locks form the internal nodes of a complete binary
//! tree, numbered breadth-first from the root; participants are the leaves.
//!
//! # Architecture
//!
//! - [`TournamentTree`] owns the canonical lock array and is cloned, read
//!   only, into every participant
//! - [`Tournament`] is one participant's private handle: its index and the
//!   stack of locks it currently holds
//! - [`setup`] allocates a tree and starts one unit per extra participant
//!   through a [`Spawner`](pairlock_core::Spawner)
//!
//! Acquisition walks leaf to root; release walks root to leaf. At each node
//! the role is the bit of the participant index that says which subtree the
//! participant came from, so two contenders at a node always hold opposite
//! roles.
//!
//! # Example
//!
//! ```ignore
//! let table = Arc::new(LockTable::default());
//! let setup = pairlock_tournament::setup(
//!     table,
//!     4,
//!     &TournamentConfig::default(),
//!     &ThreadSpawner::default(),
//!     |mut t| {
//!         t.acquire().unwrap();
//!         // critical section
//!         t.release().unwrap();
//!     },
//! )?;
//! ```

mod config;
mod error;
mod participant;
mod setup;
mod tracker;
mod tree;

pub use config::TournamentConfig;
pub use error::TournamentError;
pub use participant::Tournament;
pub use setup::{setup, TournamentSetup};
pub use tracker::HeldLocks;
pub use tree::{PathStep, TournamentTree};
