//! Integer call boundary.
//!
//! Every entry point takes and returns plain integers, the way a syscall
//! table would. Success is `0` (or a non-negative id/index); any failure is
//! `-1`. The reason for a failure is logged at `debug` and otherwise
//! dropped: callers can only tell that an operation failed, not why.
//!
//! | Call | Result |
//! |---|---|
//! | [`lock_create`] | lock id, or -1 |
//! | [`lock_acquire`] / [`lock_release`] | 0, or -1 |
//! | [`lock_destroy`] | 0, or -1 |
//! | [`tournament_create`] | participant index, or -1 |
//! | [`tournament_acquire`] / [`tournament_release`] | 0, or -1 |
//! | [`tournament_wait`] | participants joined, or -1 |
//!
//! All calls use the process-wide [`LockTable`](pairlock_table::LockTable).

mod lock;
mod tournament;

pub use lock::{lock_acquire, lock_create, lock_destroy, lock_release};
pub use tournament::{tournament_acquire, tournament_create, tournament_release, tournament_wait};

use std::fmt::Display;
use tracing::debug;

/// Return value for any failure.
pub const FAILURE: i32 = -1;

/// Collapse a result to `0` or [`FAILURE`].
fn status<E: Display>(call: &'static str, result: Result<(), E>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            debug!(call, error = %e, "Call failed");
            FAILURE
        }
    }
}
