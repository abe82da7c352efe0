//! Tournament setup: allocate the tree, then start one unit per participant.

use crate::{Tournament, TournamentConfig, TournamentError, TournamentTree};
use pairlock_core::Spawner;
use pairlock_table::LockTable;
use pairlock_types::ParticipantIndex;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of [`setup`] as seen by the calling unit.
#[derive(Debug)]
pub struct TournamentSetup<H> {
    /// The caller's own handle. The caller is always participant 0.
    pub tournament: Tournament,
    /// Handles for participants `1..N`, in index order.
    pub children: Vec<H>,
}

/// Create a tournament for `participants` units and start all but the first.
///
/// Allocates the `participants - 1` locks, then asks `spawner` for one unit
/// per index in `1..participants`. Each spawned unit runs `body` with its own
/// [`Tournament`]; the caller keeps index 0.
///
/// # Errors
///
/// - [`TournamentError::InvalidCount`] for a bad participant count
/// - [`TournamentError::NoCapacity`] if the table cannot supply the locks
/// - [`TournamentError::Spawn`] if any unit fails to start. Units that
///   already started keep running and no locks are released
pub fn setup<S, F>(
    table: Arc<LockTable>,
    participants: usize,
    config: &TournamentConfig,
    spawner: &S,
    body: F,
) -> Result<TournamentSetup<S::Handle>, TournamentError>
where
    S: Spawner,
    F: Fn(Tournament) + Send + Sync + 'static,
{
    let tree = TournamentTree::create(table, participants, config)?;
    let body = Arc::new(body);

    let mut children = Vec::with_capacity(participants.saturating_sub(1));
    for i in 1..participants {
        let index = ParticipantIndex(i);
        let tournament = tree.participant(index)?;
        let body = Arc::clone(&body);

        let handle = spawner
            .spawn(index, Box::new(move || body(tournament)))
            .map_err(|e| {
                warn!(%index, spawned = children.len(), error = %e, "Participant spawn failed");
                e
            })?;
        children.push(handle);
    }

    info!(participants, levels = tree.levels(), "Tournament set up");
    Ok(TournamentSetup {
        tournament: tree.participant(ParticipantIndex::FIRST)?,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairlock_core::{ParticipantBody, SpawnError, ThreadSpawner};
    use pairlock_table::LockTableConfig;
    use pairlock_test_helpers::CriticalSectionLog;
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    /// Records requested indices and fails at one of them.
    struct FailingSpawner {
        fail_at: usize,
        started: Mutex<Vec<usize>>,
    }

    impl Spawner for FailingSpawner {
        type Handle = ();

        fn spawn(
            &self,
            index: ParticipantIndex,
            _body: ParticipantBody,
        ) -> Result<(), SpawnError> {
            if index.get() == self.fail_at {
                return Err(SpawnError::Failed {
                    index,
                    reason: "out of process slots".to_string(),
                });
            }
            self.started.lock().push(index.get());
            Ok(())
        }
    }

    #[test]
    #[traced_test]
    fn test_setup_runs_every_participant() {
        const ROUNDS: usize = 50;

        let table = Arc::new(LockTable::default());
        let log = Arc::new(CriticalSectionLog::new());

        let work = {
            let log = Arc::clone(&log);
            move |mut t: Tournament| {
                for _ in 0..ROUNDS {
                    t.acquire().unwrap();
                    assert_eq!(t.held().len(), 3);
                    drop(log.enter(t.index().get()));
                    t.release().unwrap();
                }
            }
        };

        let setup = setup(
            table.clone(),
            8,
            &TournamentConfig::default(),
            &ThreadSpawner::new("tournament-test"),
            work.clone(),
        )
        .unwrap();

        assert_eq!(setup.tournament.index(), ParticipantIndex(0));
        assert_eq!(setup.tournament.participants(), 8);
        assert_eq!(setup.children.len(), 7);

        work(setup.tournament);
        for child in setup.children {
            child.join().unwrap();
        }

        for i in 0..8 {
            assert_eq!(log.visits_by(i), ROUNDS);
        }
        assert!(log.is_exclusive());
        assert_eq!(table.active_count(), 7);
        assert!(logs_contain("Tournament set up"));
    }

    #[test]
    fn test_setup_reports_spawn_failure() {
        let table = Arc::new(LockTable::default());
        let spawner = FailingSpawner {
            fail_at: 2,
            started: Mutex::new(Vec::new()),
        };

        let result = setup(table.clone(), 4, &TournamentConfig::default(), &spawner, |_| {});

        assert!(matches!(
            result,
            Err(TournamentError::Spawn(SpawnError::Failed {
                index: ParticipantIndex(2),
                ..
            }))
        ));
        // No retry, no further spawns, and the locks stay allocated
        assert_eq!(*spawner.started.lock(), vec![1]);
        assert_eq!(table.active_count(), 3);
    }

    #[test]
    fn test_setup_rejects_bad_count_before_allocating() {
        let table = Arc::new(LockTable::default());
        let spawner = FailingSpawner {
            fail_at: usize::MAX,
            started: Mutex::new(Vec::new()),
        };

        let result = setup(table.clone(), 5, &TournamentConfig::default(), &spawner, |_| {});

        assert!(matches!(
            result,
            Err(TournamentError::InvalidCount { count: 5, .. })
        ));
        assert!(spawner.started.lock().is_empty());
        assert_eq!(table.active_count(), 0);
    }

    #[test]
    fn test_setup_no_capacity() {
        let table = Arc::new(LockTable::new(LockTableConfig::with_capacity(4)));
        let spawner = FailingSpawner {
            fail_at: usize::MAX,
            started: Mutex::new(Vec::new()),
        };

        let result = setup(table, 8, &TournamentConfig::default(), &spawner, |_| {});

        assert!(matches!(result, Err(TournamentError::NoCapacity(_))));
        assert!(spawner.started.lock().is_empty());
    }
}
