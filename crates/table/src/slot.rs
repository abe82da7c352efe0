//! One reusable two-party lock record.
//!
//! Lifecycle of the state word:
//!
//! ```text
//!   Free --claim--> Claiming --publish--> Active --retire--> Retiring --free--> Free
//! ```
//!
//! Only `Active` slots accept acquire/release. The intermediate states keep
//! half-initialised or half-torn-down slots invisible to everyone else.
//!
//! Intent flags and the turn word carry the generation they were written
//! under. A caller that observed an older generation can neither satisfy nor
//! block the wait condition of the lock now occupying the slot, and it can
//! only ever clear its own intent.

use pairlock_types::Role;
use std::sync::atomic::{fence, AtomicU64, AtomicU8, Ordering};

const FREE: u8 = 0;
const CLAIMING: u8 = 1;
const ACTIVE: u8 = 2;
const RETIRING: u8 = 3;

const NO_INTENT: u64 = 0;

/// Flag value for an intent announced under `generation`. Never zero.
fn intent_tag(generation: u64) -> u64 {
    generation + 1
}

/// Turn value naming `role` under `generation`.
fn turn_word(generation: u64, role: Role) -> u64 {
    (intent_tag(generation) << 1) | role.index() as u64
}

/// Peterson state for one lock.
///
/// `flag[r]` is role `r`'s tagged intent to enter; `turn` names the role
/// that yields when both want in. `generation` changes every time the slot
/// is retired, so a waiter can tell "still the lock I started on" from "a
/// different lock that reuses this slot".
#[derive(Debug)]
pub(crate) struct LockSlot {
    state: AtomicU8,
    generation: AtomicU64,
    flag: [AtomicU64; 2],
    turn: AtomicU64,
}

impl LockSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(FREE),
            generation: AtomicU64::new(0),
            flag: [AtomicU64::new(NO_INTENT), AtomicU64::new(NO_INTENT)],
            turn: AtomicU64::new(turn_word(0, Role::Zero)),
        }
    }

    /// Claim a free slot and initialise it.
    ///
    /// Returns false if the slot was not free. The claim is one CAS, so two
    /// creators can never both win the same slot.
    pub(crate) fn try_claim(&self) -> bool {
        if self
            .state
            .compare_exchange(FREE, CLAIMING, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        let generation = self.generation.load(Ordering::Acquire);
        self.flag[0].store(NO_INTENT, Ordering::Relaxed);
        self.flag[1].store(NO_INTENT, Ordering::Relaxed);
        self.turn
            .store(turn_word(generation, Role::Zero), Ordering::Relaxed);

        // Publishing with Release makes the zeroed fields visible to anyone
        // who observes ACTIVE with Acquire.
        self.state.store(ACTIVE, Ordering::Release);
        true
    }

    /// Snapshot the generation if the slot is active.
    pub(crate) fn enter(&self) -> Option<u64> {
        if self.state.load(Ordering::Acquire) != ACTIVE {
            return None;
        }
        Some(self.generation.load(Ordering::Acquire))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == ACTIVE
    }

    /// True while the slot is active and has not been retired since
    /// `generation` was observed.
    pub(crate) fn is_live(&self, generation: u64) -> bool {
        self.state.load(Ordering::SeqCst) == ACTIVE
            && self.generation.load(Ordering::SeqCst) == generation
    }

    /// Announce intent for `role` and give priority to the other role.
    ///
    /// Returns false, with the intent withdrawn again, if the slot was
    /// retired after `generation` was observed.
    pub(crate) fn announce(&self, role: Role, generation: u64) -> bool {
        let tag = intent_tag(generation);
        let turn = turn_word(generation, role.other());

        // Writes never overwrite a value from a newer generation.
        let _ = self.flag[role.index()].fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
            (cur <= tag).then_some(tag)
        });
        let _ = self.turn.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
            (cur >> 1 <= tag).then_some(turn)
        });
        // Our intent must be visible before we read the other side's.
        fence(Ordering::SeqCst);

        if self.is_live(generation) {
            return true;
        }
        self.withdraw(role, generation);
        false
    }

    /// Peterson's wait condition for `role`.
    pub(crate) fn must_wait(&self, role: Role, generation: u64) -> bool {
        let other = role.other();
        self.flag[other.index()].load(Ordering::SeqCst) == intent_tag(generation)
            && self.turn.load(Ordering::SeqCst) == turn_word(generation, other)
    }

    /// Withdraw intent for `role` announced under `generation`.
    pub(crate) fn withdraw(&self, role: Role, generation: u64) {
        let _ = self.flag[role.index()].compare_exchange(
            intent_tag(generation),
            NO_INTENT,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        fence(Ordering::SeqCst);
    }

    /// Take the slot out of service.
    ///
    /// Returns false if it was not active. Waiters see the bumped generation
    /// or the non-active state on their next check, whichever comes first.
    pub(crate) fn retire(&self) -> bool {
        if self
            .state
            .compare_exchange(ACTIVE, RETIRING, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        self.flag[0].store(NO_INTENT, Ordering::SeqCst);
        self.flag[1].store(NO_INTENT, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        fence(Ordering::SeqCst);

        self.state.store(FREE, Ordering::Release);
        true
    }

    #[cfg(test)]
    pub(crate) fn intent(&self, role: Role) -> bool {
        self.flag[role.index()].load(Ordering::SeqCst) != NO_INTENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claimed() -> (LockSlot, u64) {
        let slot = LockSlot::new();
        assert!(slot.try_claim());
        let generation = slot.enter().unwrap();
        (slot, generation)
    }

    #[test]
    fn test_claim_and_retire() {
        let slot = LockSlot::new();
        assert!(!slot.is_active());
        assert!(slot.enter().is_none());

        assert!(slot.try_claim());
        assert!(slot.is_active());
        // Already active
        assert!(!slot.try_claim());

        let generation = slot.enter().unwrap();
        assert!(slot.is_live(generation));

        assert!(slot.retire());
        assert!(!slot.is_active());
        assert!(!slot.is_live(generation));
        // Already free
        assert!(!slot.retire());
    }

    #[test]
    fn test_reclaim_changes_generation() {
        let (slot, first) = claimed();

        assert!(slot.retire());
        assert!(slot.try_claim());
        let second = slot.enter().unwrap();

        assert_ne!(first, second);
        assert!(!slot.is_live(first));
        assert!(slot.is_live(second));
    }

    #[test]
    fn test_wait_condition() {
        let (slot, g) = claimed();

        // Alone: no wait
        assert!(slot.announce(Role::Zero, g));
        assert!(!slot.must_wait(Role::Zero, g));

        // Role 1 arrives second and defers to role 0
        assert!(slot.announce(Role::One, g));
        assert!(slot.must_wait(Role::One, g));
        assert!(!slot.must_wait(Role::Zero, g));

        // Role 0 leaves, role 1 may proceed
        slot.withdraw(Role::Zero, g);
        assert!(!slot.must_wait(Role::One, g));
    }

    #[test]
    fn test_retire_clears_intent() {
        let (slot, g) = claimed();
        assert!(slot.announce(Role::Zero, g));
        assert!(slot.announce(Role::One, g));

        assert!(slot.retire());
        assert!(!slot.intent(Role::Zero));
        assert!(!slot.intent(Role::One));
    }

    #[test]
    fn test_announce_after_retire_leaves_free_slot_clean() {
        let (slot, g) = claimed();
        assert!(slot.retire());

        assert!(!slot.announce(Role::Zero, g));
        assert!(!slot.intent(Role::Zero));
    }

    #[test]
    fn test_announce_after_reclaim_does_not_touch_new_lock() {
        let (slot, old) = claimed();
        assert!(slot.retire());
        assert!(slot.try_claim());
        let new = slot.enter().unwrap();

        // Role 0 of the new lock is waiting its turn against role 1
        assert!(slot.announce(Role::One, new));
        assert!(slot.announce(Role::Zero, new));
        assert!(slot.must_wait(Role::Zero, new));

        // A caller that entered under the old generation announces late
        assert!(!slot.announce(Role::One, old));
        assert!(!slot.announce(Role::Zero, old));

        // The new lock's intents and turn are untouched
        assert!(slot.intent(Role::Zero));
        assert!(slot.intent(Role::One));
        assert!(slot.must_wait(Role::Zero, new));
        assert!(!slot.must_wait(Role::One, new));

        // A stale withdraw cannot clear the new lock's intent
        slot.withdraw(Role::One, old);
        assert!(slot.must_wait(Role::Zero, new));
    }

    #[test]
    fn test_cancelled_intent_does_not_block_new_lock() {
        let (slot, old) = claimed();
        assert!(slot.retire());
        assert!(slot.try_claim());
        let new = slot.enter().unwrap();

        assert!(!slot.announce(Role::Zero, old));

        // Role 1 on the new lock is not held up by the cancelled intent
        assert!(slot.announce(Role::One, new));
        assert!(!slot.must_wait(Role::One, new));
    }
}
