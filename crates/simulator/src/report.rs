//! Results of a simulation run.

use std::time::Duration;

/// Summary of a completed, exclusion-preserving run.
#[derive(Clone, Debug)]
pub struct SimulationReport {
    /// Participants that competed.
    pub participants: usize,

    /// Critical-section entries, indexed by participant.
    pub visits: Vec<usize>,

    /// Most participants ever inside at once. 1 for a correct run.
    pub max_occupancy: usize,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl SimulationReport {
    /// Entries across all participants.
    pub fn total_entries(&self) -> usize {
        self.visits.iter().sum()
    }

    /// Entries per second of wall-clock time.
    pub fn entries_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_entries() as f64 / secs
        } else {
            0.0
        }
    }

    /// Fewest entries by any participant.
    pub fn min_visits(&self) -> usize {
        self.visits.iter().copied().min().unwrap_or(0)
    }

    /// Print a summary to stdout.
    pub fn print(&self) {
        println!("\n=== Simulation Report ===");
        println!("Participants:      {}", self.participants);
        println!("Entries:           {}", self.total_entries());
        println!("Elapsed:           {:.2?}", self.elapsed);
        println!("Throughput:        {:.1} entries/sec", self.entries_per_sec());
        println!("Max occupancy:     {}", self.max_occupancy);
        for (i, visits) in self.visits.iter().enumerate() {
            println!("  participant {:>2}:  {}", i, visits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let report = SimulationReport {
            participants: 3,
            visits: vec![4, 5, 6],
            max_occupancy: 1,
            elapsed: Duration::from_secs(3),
        };

        assert_eq!(report.total_entries(), 15);
        assert_eq!(report.min_visits(), 4);
        assert!((report.entries_per_sec() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_elapsed() {
        let report = SimulationReport {
            participants: 0,
            visits: Vec::new(),
            max_occupancy: 0,
            elapsed: Duration::ZERO,
        };

        assert_eq!(report.entries_per_sec(), 0.0);
        assert_eq!(report.min_visits(), 0);
    }
}
