//! The canonical lock array and the leaf-to-root path computation.

use crate::{Tournament, TournamentConfig, TournamentError};
use pairlock_table::LockTable;
use pairlock_types::{LockId, ParticipantIndex, Role};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One step of a participant's path through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Tree level, 0 at the root.
    pub level: u32,
    /// Position in the breadth-first lock array.
    pub node: usize,
    /// Role the participant plays at this node.
    pub role: Role,
}

/// Ordered steps from the leaf-level node up to the root.
///
/// At `level`, the participant's role is bit `levels - level - 1` of its
/// index, and its node within the level is `index >> (levels - level)`.
/// Levels start at array offset `2^level - 1`.
pub(crate) fn path(index: usize, levels: u32) -> Vec<PathStep> {
    (0..levels)
        .rev()
        .map(|level| {
            let role = Role::from_bit(index >> (levels - level - 1));
            let position = index >> (levels - level);
            PathStep {
                level,
                node: position + (1 << level) - 1,
                role,
            }
        })
        .collect()
}

/// A tournament tree of two-party locks.
///
/// Cloning is cheap and shares the same canonical lock array; every
/// participant of one tournament reads the same array and never writes it.
#[derive(Debug, Clone)]
pub struct TournamentTree {
    table: Arc<LockTable>,
    locks: Arc<[LockId]>,
    participants: usize,
    levels: u32,
}

impl TournamentTree {
    /// Allocate the `participants - 1` locks of a new tree from `table`.
    ///
    /// Locks are created root first, then each level left to right.
    ///
    /// # Errors
    ///
    /// - [`TournamentError::InvalidCount`] if `participants` is zero, not a
    ///   power of two, or larger than `config.max_participants`
    /// - [`TournamentError::NoCapacity`] if the table runs out of slots.
    ///   Locks created before the failure stay allocated unless
    ///   `config.rollback_on_failure` is set
    pub fn create(
        table: Arc<LockTable>,
        participants: usize,
        config: &TournamentConfig,
    ) -> Result<Self, TournamentError> {
        if !participants.is_power_of_two() || participants > config.max_participants {
            return Err(TournamentError::InvalidCount {
                count: participants,
                max: config.max_participants,
            });
        }

        let levels = participants.trailing_zeros();
        let mut locks = Vec::with_capacity(participants - 1);
        for _ in 0..participants - 1 {
            match table.create() {
                Ok(id) => locks.push(id),
                Err(e) => {
                    warn!(
                        participants,
                        created = locks.len(),
                        rollback = config.rollback_on_failure,
                        "Tournament lock allocation failed"
                    );
                    if config.rollback_on_failure {
                        for id in locks {
                            // Freshly created and never shared, so only a
                            // concurrent misuse of the id could make this fail.
                            let _ = table.destroy(id);
                        }
                    }
                    return Err(TournamentError::NoCapacity(e));
                }
            }
        }

        info!(participants, levels, "Tournament tree created");
        Ok(Self {
            table,
            locks: locks.into(),
            participants,
            levels,
        })
    }

    /// Handle for participant `index`, holding nothing.
    ///
    /// # Errors
    ///
    /// [`TournamentError::InvalidParticipant`] if `index` is not below the
    /// participant count.
    pub fn participant(&self, index: ParticipantIndex) -> Result<Tournament, TournamentError> {
        if index.get() >= self.participants {
            return Err(TournamentError::InvalidParticipant {
                index,
                count: self.participants,
            });
        }
        Ok(Tournament::new(self.clone(), index))
    }

    /// Leaf-to-root path of `(node, role)` steps for participant `index`.
    ///
    /// # Errors
    ///
    /// [`TournamentError::InvalidParticipant`] if `index` is out of range.
    pub fn path(&self, index: ParticipantIndex) -> Result<Vec<PathStep>, TournamentError> {
        if index.get() >= self.participants {
            return Err(TournamentError::InvalidParticipant {
                index,
                count: self.participants,
            });
        }
        Ok(path(index.get(), self.levels))
    }

    /// Destroy every lock of the tree.
    ///
    /// Only call once no participant holds or waits for any of them.
    /// Keeps going after a failure and reports the first one.
    pub fn destroy(&self) -> Result<(), TournamentError> {
        let mut first_error = None;
        for &lock in self.locks.iter() {
            if let Err(source) = self.table.destroy(lock) {
                warn!(%lock, error = %source, "Failed to destroy tournament lock");
                if first_error.is_none() {
                    first_error = Some(TournamentError::Teardown { lock, source });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                debug!(participants = self.participants, "Tournament tree destroyed");
                Ok(())
            }
        }
    }

    /// The canonical breadth-first lock array.
    pub fn locks(&self) -> &[LockId] {
        &self.locks
    }

    /// Number of participants (leaves).
    pub fn participants(&self) -> usize {
        self.participants
    }

    /// Number of tree levels, log2 of the participant count.
    pub fn levels(&self) -> u32 {
        self.levels
    }

    pub(crate) fn table(&self) -> &LockTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairlock_table::{LockError, LockTableConfig};

    fn nodes_and_roles(index: usize, levels: u32) -> Vec<(usize, Role)> {
        path(index, levels)
            .into_iter()
            .map(|s| (s.node, s.role))
            .collect()
    }

    #[test]
    fn test_path_four_participants() {
        use Role::{One, Zero};

        assert_eq!(nodes_and_roles(0, 2), vec![(1, Zero), (0, Zero)]);
        assert_eq!(nodes_and_roles(1, 2), vec![(1, One), (0, Zero)]);
        assert_eq!(nodes_and_roles(2, 2), vec![(2, Zero), (0, One)]);
        assert_eq!(nodes_and_roles(3, 2), vec![(2, One), (0, One)]);
    }

    #[test]
    fn test_path_eight_participants() {
        use Role::{One, Zero};

        // 5 = 0b101
        assert_eq!(
            nodes_and_roles(5, 3),
            vec![(5, One), (2, Zero), (0, One)]
        );
        let levels: Vec<_> = path(5, 3).iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![2, 1, 0]);
    }

    #[test]
    fn test_path_single_participant_is_empty() {
        assert!(path(0, 0).is_empty());
    }

    #[test]
    fn test_path_ends_at_root_and_stays_in_bounds() {
        for levels in 1..=4u32 {
            let participants = 1usize << levels;
            for index in 0..participants {
                let steps = path(index, levels);
                assert_eq!(steps.len(), levels as usize);
                assert_eq!(steps.last().map(|s| s.node), Some(0));
                assert!(steps.iter().all(|s| s.node < participants - 1));
            }
        }
    }

    #[test]
    fn test_contenders_meet_with_opposite_roles() {
        // Any two participants first meet at their lowest common node, and
        // must arrive there from different subtrees.
        let levels = 4;
        let participants = 1usize << levels;
        for a in 0..participants {
            for b in (a + 1)..participants {
                let pa = path(a, levels);
                let pb = path(b, levels);
                let meet = pa
                    .iter()
                    .zip(pb.iter())
                    .find(|(sa, sb)| sa.node == sb.node)
                    .expect("every pair meets at the root at the latest");
                assert_ne!(meet.0.role, meet.1.role, "participants {a} and {b}");
            }
        }
    }

    #[test]
    fn test_create_allocates_breadth_first() {
        let table = Arc::new(LockTable::default());
        let tree = TournamentTree::create(table.clone(), 8, &TournamentConfig::default()).unwrap();

        assert_eq!(tree.participants(), 8);
        assert_eq!(tree.levels(), 3);
        assert_eq!(tree.locks().len(), 7);
        assert_eq!(table.active_count(), 7);
        let expected: Vec<_> = (0..7).map(LockId).collect();
        assert_eq!(tree.locks(), expected.as_slice());
    }

    #[test]
    fn test_create_rejects_bad_counts() {
        let table = Arc::new(LockTable::default());
        let config = TournamentConfig::default();

        for count in [0, 3, 6, 12, 32] {
            match TournamentTree::create(table.clone(), count, &config) {
                Err(TournamentError::InvalidCount { count: c, max }) => {
                    assert_eq!(c, count);
                    assert_eq!(max, 16);
                }
                other => panic!("count {count}: unexpected {other:?}"),
            }
        }
        assert_eq!(table.active_count(), 0);
    }

    #[test]
    fn test_single_participant_needs_no_locks() {
        let table = Arc::new(LockTable::new(LockTableConfig::with_capacity(0)));
        let tree = TournamentTree::create(table, 1, &TournamentConfig::default()).unwrap();
        assert_eq!(tree.levels(), 0);
        assert!(tree.locks().is_empty());
    }

    #[test]
    fn test_sixteen_way_fits_default_table() {
        let table = Arc::new(LockTable::default());
        let tree = TournamentTree::create(table.clone(), 16, &TournamentConfig::default()).unwrap();
        assert_eq!(tree.locks().len(), 15);
        assert_eq!(table.active_count(), table.capacity());
    }

    #[test]
    fn test_no_capacity_leaks_partial_allocation_by_default() {
        let table = Arc::new(LockTable::new(LockTableConfig::with_capacity(2)));

        let result = TournamentTree::create(table.clone(), 4, &TournamentConfig::default());
        assert!(matches!(
            result,
            Err(TournamentError::NoCapacity(LockError::NoCapacity { capacity: 2 }))
        ));
        assert_eq!(table.active_count(), 2);
    }

    #[test]
    fn test_no_capacity_rolls_back_when_configured() {
        let table = Arc::new(LockTable::new(LockTableConfig::with_capacity(2)));
        let config = TournamentConfig::default().with_rollback();

        let result = TournamentTree::create(table.clone(), 4, &config);
        assert!(matches!(result, Err(TournamentError::NoCapacity(_))));
        assert_eq!(table.active_count(), 0);
    }

    #[test]
    fn test_participant_out_of_range() {
        let table = Arc::new(LockTable::default());
        let tree = TournamentTree::create(table, 4, &TournamentConfig::default()).unwrap();

        assert!(tree.participant(ParticipantIndex(3)).is_ok());
        assert!(matches!(
            tree.participant(ParticipantIndex(4)),
            Err(TournamentError::InvalidParticipant { count: 4, .. })
        ));
        assert!(tree.path(ParticipantIndex(4)).is_err());
    }

    #[test]
    fn test_destroy_frees_every_lock() {
        let table = Arc::new(LockTable::default());
        let tree = TournamentTree::create(table.clone(), 4, &TournamentConfig::default()).unwrap();
        assert_eq!(table.active_count(), 3);

        tree.destroy().unwrap();
        assert_eq!(table.active_count(), 0);

        // Second teardown reports the first lock that was already gone
        assert!(matches!(
            tree.destroy(),
            Err(TournamentError::Teardown { lock: LockId(0), .. })
        ));
    }
}
