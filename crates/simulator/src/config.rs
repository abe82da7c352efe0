//! Configuration types for the simulator.

use std::time::Duration;

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    /// Number of competing participants. Ignored by the two-party scenario,
    /// which always uses two.
    pub participants: usize,

    /// Critical-section entries per participant.
    pub rounds: usize,

    /// Upper bound on time spent inside the critical section per entry.
    pub hold: Duration,

    /// Upper bound on time spent outside between entries.
    pub pause: Duration,

    /// Random seed for hold/pause jitter.
    pub seed: u64,
}

impl SimulatorConfig {
    /// Create a new configuration for `participants` participants.
    pub fn new(participants: usize) -> Self {
        Self {
            participants,
            rounds: 10,
            hold: Duration::from_micros(500),
            pause: Duration::from_micros(500),
            seed: 12345,
        }
    }

    /// Set the number of rounds per participant.
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the maximum hold time.
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Set the maximum pause time.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Total critical-section entries expected from a run.
    pub fn total_entries(&self) -> usize {
        self.participants * self.rounds
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SimulatorConfig::new(8)
            .with_rounds(3)
            .with_hold(Duration::ZERO)
            .with_pause(Duration::from_millis(1))
            .with_seed(7);

        assert_eq!(config.participants, 8);
        assert_eq!(config.rounds, 3);
        assert_eq!(config.hold, Duration::ZERO);
        assert_eq!(config.pause, Duration::from_millis(1));
        assert_eq!(config.seed, 7);
        assert_eq!(config.total_entries(), 24);
    }
}
