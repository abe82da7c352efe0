//! Lock table entry points.

use crate::{status, FAILURE};
use pairlock_table::{LockError, LockTable};
use pairlock_types::{LockId, Role};
use tracing::debug;

/// Create a lock. Returns its id, or -1 if the table is full.
pub fn lock_create() -> i32 {
    match LockTable::global().create() {
        Ok(id) => i32::try_from(id.index()).unwrap_or(FAILURE),
        Err(e) => {
            debug!(call = "lock_create", error = %e, "Call failed");
            FAILURE
        }
    }
}

/// Acquire lock `lock_id` as `role` (0 or 1). Blocks until entered.
pub fn lock_acquire(lock_id: i32, role: i32) -> i32 {
    let result =
        parse(lock_id, role).and_then(|(id, role)| LockTable::global().acquire(id, role));
    status("lock_acquire", result)
}

/// Release lock `lock_id` as `role` (0 or 1).
pub fn lock_release(lock_id: i32, role: i32) -> i32 {
    let result =
        parse(lock_id, role).and_then(|(id, role)| LockTable::global().release(id, role));
    status("lock_release", result)
}

/// Destroy lock `lock_id`, cancelling any waiter.
pub fn lock_destroy(lock_id: i32) -> i32 {
    let result = parse_id(lock_id).and_then(|id| LockTable::global().destroy(id));
    status("lock_destroy", result)
}

fn parse_id(raw: i32) -> Result<LockId, LockError> {
    LockId::from_raw(raw)
        .ok_or_else(|| LockError::InvalidArgument(format!("negative lock id {raw}")))
}

fn parse(lock_id: i32, role: i32) -> Result<(LockId, Role), LockError> {
    let id = parse_id(lock_id)?;
    let role = Role::from_raw(role)
        .ok_or_else(|| LockError::InvalidArgument(format!("role {role} is not 0 or 1")))?;
    Ok((id, role))
}
