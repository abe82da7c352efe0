//! Identifier types for two-party locks and tournament participants.
//!
//! These are plain value types with no behaviour beyond validation of raw
//! integers crossing the call boundary. Everything that owns state lives in
//! `pairlock-table` and `pairlock-tournament`.

mod identifiers;

pub use identifiers::{LockId, ParticipantIndex, Role};
