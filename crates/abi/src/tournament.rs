//! Tournament entry points.
//!
//! Each execution unit keeps its own tournament handle in thread-local
//! storage, the way a forked process keeps its own copy of library globals.

use crate::{status, FAILURE};
use pairlock_core::ThreadSpawner;
use pairlock_table::LockTable;
use pairlock_tournament::{Tournament, TournamentConfig, TournamentError};
use std::cell::RefCell;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

thread_local! {
    static PARTICIPANT: RefCell<Option<Tournament>> = const { RefCell::new(None) };
    static CHILDREN: RefCell<Vec<JoinHandle<()>>> = const { RefCell::new(Vec::new()) };
}

/// Create a tournament of `processes` participants.
///
/// `processes` must be a power of two no greater than 16. The caller
/// becomes participant 0 and gets `0` back. Every other participant starts
/// on its own thread and runs `entry` with its index once its handle is
/// installed, so `entry` can call [`tournament_acquire`] and
/// [`tournament_release`] directly.
///
/// Returns -1 on an invalid count, when the table is out of locks, when
/// a participant could not be started, or when this unit is still inside
/// the critical section of an earlier tournament.
pub fn tournament_create(processes: i32, entry: fn(i32)) -> i32 {
    let Ok(count) = usize::try_from(processes) else {
        debug!(call = "tournament_create", processes, "Negative participant count");
        return FAILURE;
    };

    let holding = PARTICIPANT.with(|p| p.borrow().as_ref().map_or(0, |t| t.held().len()));
    if holding > 0 {
        debug!(call = "tournament_create", holding, "Current tournament still holds locks");
        return FAILURE;
    }

    let result = pairlock_tournament::setup(
        Arc::clone(LockTable::global()),
        count,
        &TournamentConfig::default(),
        &ThreadSpawner::new("tournament"),
        move |tournament: Tournament| {
            let index = tournament.index().get() as i32;
            PARTICIPANT.with(|p| *p.borrow_mut() = Some(tournament));
            entry(index);
        },
    );

    match result {
        Ok(setup) => {
            let index = setup.tournament.index().get() as i32;
            PARTICIPANT.with(|p| *p.borrow_mut() = Some(setup.tournament));
            CHILDREN.with(|c| c.borrow_mut().extend(setup.children));
            index
        }
        Err(e) => {
            debug!(call = "tournament_create", error = %e, "Call failed");
            FAILURE
        }
    }
}

/// Enter this participant's tournament critical section.
pub fn tournament_acquire() -> i32 {
    let result = with_participant(|t| t.acquire());
    status("tournament_acquire", result)
}

/// Leave this participant's tournament critical section.
pub fn tournament_release() -> i32 {
    let result = with_participant(|t| t.release());
    status("tournament_release", result)
}

/// Wait for every participant this unit started.
///
/// Returns how many were joined, or -1 if any of them panicked.
pub fn tournament_wait() -> i32 {
    let children = CHILDREN.with(|c| std::mem::take(&mut *c.borrow_mut()));

    let mut joined = 0;
    let mut panicked = false;
    for child in children {
        if child.join().is_err() {
            warn!("Tournament participant panicked");
            panicked = true;
        }
        joined += 1;
    }

    if panicked {
        FAILURE
    } else {
        joined
    }
}

fn with_participant(
    f: impl FnOnce(&mut Tournament) -> Result<(), TournamentError>,
) -> Result<(), TournamentError> {
    PARTICIPANT.with(|p| match p.borrow_mut().as_mut() {
        Some(tournament) => f(tournament),
        None => Err(TournamentError::NotSetUp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairlock_test_helpers::CriticalSectionLog;
    use serial_test::serial;
    use std::sync::OnceLock;

    fn log() -> &'static CriticalSectionLog {
        static LOG: OnceLock<CriticalSectionLog> = OnceLock::new();
        LOG.get_or_init(CriticalSectionLog::new)
    }

    const ROUNDS: usize = 25;

    fn compete(index: i32) {
        for _ in 0..ROUNDS {
            assert_eq!(tournament_acquire(), 0);
            drop(log().enter(index as usize));
            assert_eq!(tournament_release(), 0);
        }
    }

    fn idle(_index: i32) {}

    #[test]
    #[serial]
    fn test_calls_without_tournament_fail() {
        // Fresh thread, so no participant is installed
        std::thread::spawn(|| {
            assert_eq!(tournament_acquire(), FAILURE);
            assert_eq!(tournament_release(), FAILURE);
            assert_eq!(tournament_wait(), 0);
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_invalid_counts_rejected() {
        std::thread::spawn(|| {
            for count in [-4, 0, 3, 6, 32] {
                assert_eq!(tournament_create(count, idle), FAILURE, "count {count}");
            }
            assert_eq!(tournament_acquire(), FAILURE);
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_create_refused_while_holding() {
        std::thread::spawn(|| {
            assert_eq!(tournament_create(2, idle), 0);
            assert_eq!(tournament_acquire(), 0);

            // Replacing the handle now would strand the held lock
            assert_eq!(tournament_create(2, idle), FAILURE);

            // The original handle is still installed and can release
            assert_eq!(tournament_release(), 0);
            assert_eq!(tournament_wait(), 1);
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_four_way_tournament() {
        std::thread::spawn(|| {
            let index = tournament_create(4, compete);
            assert_eq!(index, 0);

            compete(index);
            assert_eq!(tournament_wait(), 3);

            let log = log();
            for i in 0..4 {
                assert_eq!(log.visits_by(i), ROUNDS);
            }
            assert!(log.is_exclusive());
        })
        .join()
        .unwrap();
    }
}
