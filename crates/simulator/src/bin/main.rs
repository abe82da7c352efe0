//! Pairlock Simulator CLI
//!
//! Runs contention scenarios against the lock table and reports whether
//! the critical section stayed exclusive.

use clap::{Parser, Subcommand};
use pairlock_simulator::{Simulator, SimulatorConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pairlock-sim")]
#[command(about = "Contention simulator for two-party and tournament locks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Two units alternate on a single lock
    Peterson {
        /// Critical-section entries per unit
        #[arg(short, long, default_value = "10")]
        rounds: usize,

        /// Maximum time inside the critical section, in microseconds
        #[arg(long, default_value = "500")]
        hold_us: u64,

        /// Maximum time between entries, in microseconds
        #[arg(long, default_value = "500")]
        pause_us: u64,

        /// Seed for hold/pause jitter
        #[arg(long, default_value = "12345")]
        seed: u64,
    },

    /// N units compete through a tournament tree
    Tournament {
        /// Number of participants (power of two, at most 16)
        #[arg(short, long, default_value = "4")]
        participants: usize,

        /// Critical-section entries per participant
        #[arg(short, long, default_value = "10")]
        rounds: usize,

        /// Maximum time inside the critical section, in microseconds
        #[arg(long, default_value = "500")]
        hold_us: u64,

        /// Maximum time between entries, in microseconds
        #[arg(long, default_value = "500")]
        pause_us: u64,

        /// Seed for hold/pause jitter
        #[arg(long, default_value = "12345")]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let report = match cli.command {
        Commands::Peterson {
            rounds,
            hold_us,
            pause_us,
            seed,
        } => {
            let config = SimulatorConfig::new(2)
                .with_rounds(rounds)
                .with_hold(Duration::from_micros(hold_us))
                .with_pause(Duration::from_micros(pause_us))
                .with_seed(seed);
            Simulator::new(config).run_two_party()?
        }

        Commands::Tournament {
            participants,
            rounds,
            hold_us,
            pause_us,
            seed,
        } => {
            let config = SimulatorConfig::new(participants)
                .with_rounds(rounds)
                .with_hold(Duration::from_micros(hold_us))
                .with_pause(Duration::from_micros(pause_us))
                .with_seed(seed);
            Simulator::new(config).run_tournament()?
        }
    };

    report.print();
    Ok(())
}
