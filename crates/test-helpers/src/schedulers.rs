//! Instrumented schedulers.

use pairlock_core::Scheduler;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::thread;

/// Counts yields, then yields the thread.
#[derive(Debug, Default)]
pub struct CountingScheduler {
    yields: AtomicUsize,
}

impl CountingScheduler {
    /// Create a scheduler with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a waiter has yielded.
    pub fn yields(&self) -> usize {
        self.yields.load(Ordering::SeqCst)
    }
}

impl Scheduler for CountingScheduler {
    fn yield_now(&self) {
        self.yields.fetch_add(1, Ordering::SeqCst);
        thread::yield_now();
    }
}

/// Sends one message on the first yield, then behaves like a plain yield.
///
/// Lets a test block until some thread is provably inside a wait loop.
#[derive(Debug)]
pub struct SignalOnYield {
    signal: Mutex<Option<Sender<()>>>,
}

impl SignalOnYield {
    /// Signal `sender` the first time anyone yields.
    pub fn new(sender: Sender<()>) -> Self {
        Self {
            signal: Mutex::new(Some(sender)),
        }
    }
}

impl Scheduler for SignalOnYield {
    fn yield_now(&self) {
        if let Some(sender) = self.signal.lock().take() {
            // Receiver may already be gone if the test bailed out.
            let _ = sender.send(());
        }
        thread::yield_now();
    }
}
