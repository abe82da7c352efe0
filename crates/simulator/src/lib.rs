//! Pairlock Simulator
//!
//! Drives real threads through the lock table and the tournament
//! coordinator and checks that the critical section was never shared.
//!
//! # Scenarios
//!
//! - **Two-party**: two units alternate on one lock with opposite roles, then
//!   the parent destroys the lock
//! - **Tournament**: N units compete through an N-way tournament tree
//!
//! Hold and pause times are jittered from a seeded RNG so runs are
//! repeatable in their inputs, if not in their interleavings.
//!
//! # Example
//!
//! ```ignore
//! use pairlock_simulator::{Simulator, SimulatorConfig};
//! use std::time::Duration;
//!
//! let config = SimulatorConfig::new(8)
//!     .with_rounds(100)
//!     .with_hold(Duration::from_micros(200));
//!
//! let report = Simulator::new(config).run_tournament()?;
//! println!("{} entries in {:?}", report.total_entries(), report.elapsed);
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod runner;

pub use config::SimulatorConfig;
pub use error::SimulationError;
pub use report::SimulationReport;
pub use runner::Simulator;
