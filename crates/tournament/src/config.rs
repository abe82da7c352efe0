//! Tournament configuration.

/// Configuration for building a [`TournamentTree`](crate::TournamentTree).
#[derive(Debug, Clone)]
pub struct TournamentConfig {
    /// Largest participant count accepted.
    pub max_participants: usize,

    /// Destroy already-created locks when setup runs out of capacity.
    ///
    /// Off by default: a failed setup leaves its partial allocation in the
    /// table.
    pub rollback_on_failure: bool,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            max_participants: 16,
            rollback_on_failure: false,
        }
    }
}

impl TournamentConfig {
    /// Destroy partially created locks when setup fails.
    pub fn with_rollback(mut self) -> Self {
        self.rollback_on_failure = true;
        self
    }
}
