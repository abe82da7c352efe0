//! Simulation runner.

use crate::{SimulationError, SimulationReport, SimulatorConfig};
use pairlock_core::ThreadSpawner;
use pairlock_table::LockTable;
use pairlock_test_helpers::CriticalSectionLog;
use pairlock_tournament::{Tournament, TournamentConfig, TournamentError};
use pairlock_types::Role;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Runs contention scenarios against a lock table.
#[derive(Debug)]
pub struct Simulator {
    config: SimulatorConfig,
    table: Arc<LockTable>,
}

impl Simulator {
    /// Create a simulator with its own default-sized table.
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_table(config, Arc::new(LockTable::default()))
    }

    /// Create a simulator that allocates from `table`.
    pub fn with_table(config: SimulatorConfig, table: Arc<LockTable>) -> Self {
        Self { config, table }
    }

    /// The run configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Two units alternate on one lock with opposite roles.
    ///
    /// The lock is destroyed once both units have finished.
    pub fn run_two_party(&self) -> Result<SimulationReport, SimulationError> {
        let lock = self.table.create()?;
        info!(%lock, rounds = self.config.rounds, "Starting two-party run");

        let log = CriticalSectionLog::new();
        let start = Instant::now();

        let results: Vec<Result<(), SimulationError>> = thread::scope(|s| {
            let workers: Vec<_> = Role::ALL
                .into_iter()
                .map(|role| {
                    let table = &self.table;
                    let config = &self.config;
                    let log = &log;
                    s.spawn(move || -> Result<(), SimulationError> {
                        let mut rng = participant_rng(config.seed, role.index());
                        for _ in 0..config.rounds {
                            table.acquire(lock, role)?;
                            {
                                let _visit = log.enter(role.index());
                                sleep_up_to(&mut rng, config.hold);
                            }
                            table.release(lock, role)?;
                            sleep_up_to(&mut rng, config.pause);
                        }
                        Ok(())
                    })
                })
                .collect();

            workers
                .into_iter()
                .enumerate()
                .map(|(i, w)| w.join().unwrap_or(Err(SimulationError::Panicked(i))))
                .collect()
        });
        let elapsed = start.elapsed();

        self.table.destroy(lock)?;
        results.into_iter().collect::<Result<(), _>>()?;

        finish(&log, 2, elapsed)
    }

    /// N units compete through an N-way tournament tree.
    ///
    /// The tree's locks are destroyed once every participant has finished.
    pub fn run_tournament(&self) -> Result<SimulationReport, SimulationError> {
        let participants = self.config.participants;
        info!(participants, rounds = self.config.rounds, "Starting tournament run");

        let log = Arc::new(CriticalSectionLog::new());
        let failures: Arc<Mutex<Vec<TournamentError>>> = Arc::new(Mutex::new(Vec::new()));

        let body = {
            let log = Arc::clone(&log);
            let failures = Arc::clone(&failures);
            let config = self.config.clone();
            move |mut tournament: Tournament| {
                if let Err(e) = compete(&mut tournament, &config, &log) {
                    warn!(participant = %tournament.index(), error = %e, "Participant gave up");
                    failures.lock().push(e);
                }
            }
        };

        let start = Instant::now();
        let setup = pairlock_tournament::setup(
            Arc::clone(&self.table),
            participants,
            &TournamentConfig::default(),
            &ThreadSpawner::new("sim"),
            body.clone(),
        )?;
        let tree = setup.tournament.tree().clone();

        body(setup.tournament);

        let mut panicked = None;
        for (i, child) in setup.children.into_iter().enumerate() {
            if child.join().is_err() && panicked.is_none() {
                panicked = Some(i + 1);
            }
        }
        let elapsed = start.elapsed();

        tree.destroy()?;
        if let Some(index) = panicked {
            return Err(SimulationError::Panicked(index));
        }
        if let Some(e) = failures.lock().drain(..).next() {
            return Err(e.into());
        }

        finish(&log, participants, elapsed)
    }
}

fn compete(
    tournament: &mut Tournament,
    config: &SimulatorConfig,
    log: &CriticalSectionLog,
) -> Result<(), TournamentError> {
    let index = tournament.index().get();
    let mut rng = participant_rng(config.seed, index);

    for _ in 0..config.rounds {
        tournament.acquire()?;
        {
            let _visit = log.enter(index);
            sleep_up_to(&mut rng, config.hold);
        }
        tournament.release()?;
        sleep_up_to(&mut rng, config.pause);
    }
    Ok(())
}

fn finish(
    log: &CriticalSectionLog,
    participants: usize,
    elapsed: Duration,
) -> Result<SimulationReport, SimulationError> {
    if let Some((first, second)) = log.find_overlap() {
        return Err(SimulationError::Overlap {
            first: first.participant,
            second: second.participant,
        });
    }

    let report = SimulationReport {
        participants,
        visits: (0..participants).map(|i| log.visits_by(i)).collect(),
        max_occupancy: log.max_occupancy(),
        elapsed,
    };
    info!(
        participants,
        entries = report.total_entries(),
        max_occupancy = report.max_occupancy,
        elapsed_ms = elapsed.as_millis() as u64,
        "Run complete"
    );
    Ok(report)
}

fn participant_rng(seed: u64, index: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(index as u64))
}

fn sleep_up_to(rng: &mut impl Rng, max: Duration) {
    if max.is_zero() {
        return;
    }
    let micros = rng.gen_range(0..=max.as_micros() as u64);
    thread::sleep(Duration::from_micros(micros));
}
