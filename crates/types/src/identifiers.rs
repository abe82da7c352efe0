//! Domain-specific identifier types.

use std::fmt;

/// Identifier of one slot in a lock table.
///
/// Only meaningful for the table that issued it. Range checks happen in the
/// table itself, since the capacity is a property of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockId(pub usize);

impl LockId {
    /// Convert a raw integer from the call boundary.
    ///
    /// Returns `None` for negative values.
    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw).ok().map(LockId)
    }

    /// Get the raw slot index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lock({})", self.0)
    }
}

/// One of the two fixed identities a contender uses on a two-party lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Role 0.
    Zero,
    /// Role 1.
    One,
}

impl Role {
    /// Both roles, in index order.
    pub const ALL: [Role; 2] = [Role::Zero, Role::One];

    /// Convert a raw integer from the call boundary.
    ///
    /// Only `0` and `1` are valid roles.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Role::Zero),
            1 => Some(Role::One),
            _ => None,
        }
    }

    /// Build a role from the lowest bit of `bit`.
    pub fn from_bit(bit: usize) -> Self {
        if bit & 1 == 0 {
            Role::Zero
        } else {
            Role::One
        }
    }

    /// Index into per-role arrays.
    pub fn index(self) -> usize {
        match self {
            Role::Zero => 0,
            Role::One => 1,
        }
    }

    /// The opposing role.
    pub fn other(self) -> Self {
        match self {
            Role::Zero => Role::One,
            Role::One => Role::Zero,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Role({})", self.index())
    }
}

/// Position of a participant among the leaves of a tournament tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantIndex(pub usize);

impl ParticipantIndex {
    /// The participant that performs setup.
    pub const FIRST: Self = ParticipantIndex(0);

    /// Get the raw index.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ParticipantIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Participant({})", self.0)
    }
}
