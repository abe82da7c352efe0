//! Test helpers for pairlock.
//!
//! - [`CriticalSectionLog`] records when each participant was inside a
//!   critical section and checks that no two visits overlap.
//! - [`CountingScheduler`] and [`SignalOnYield`] are [`Scheduler`]s that let
//!   a test observe a lock's wait loop.
//!
//! [`Scheduler`]: pairlock_core::Scheduler

mod log;
mod schedulers;

pub use log::{CriticalSectionLog, Interval, Visit};
pub use schedulers::{CountingScheduler, SignalOnYield};
