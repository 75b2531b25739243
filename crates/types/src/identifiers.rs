//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant identifier, `0..N`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// Position of this participant in per-peer vectors.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Largest participant count whose ids all fit a `ParticipantId`.
    pub const MAX_PARTICIPANTS: usize = u32::MAX as usize;

    /// Iterate over every participant id of an `n`-participant system.
    ///
    /// Counts above [`Self::MAX_PARTICIPANTS`] are clamped.
    pub fn all(n: usize) -> impl Iterator<Item = ParticipantId> {
        (0..u32::try_from(n).unwrap_or(u32::MAX)).map(ParticipantId)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Per-initiator snapshot sequence number.
///
/// Each initiator numbers its own rounds starting at zero; two initiators may
/// hand out the same value, so a round is only identified by [`RoundKey`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoundId(pub u64);

impl RoundId {
    /// First round an initiator opens.
    pub const FIRST: Self = RoundId(0);

    /// Get the next round id.
    pub fn next(self) -> Self {
        RoundId(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Identity of a snapshot round: who started it, and which of its rounds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RoundKey {
    /// Participant that executed the `SNAPSHOT` action.
    pub initiator: ParticipantId,
    /// The initiator's sequence number for this round.
    pub round: RoundId,
}

impl RoundKey {
    /// Create a round key.
    pub fn new(initiator: ParticipantId, round: RoundId) -> Self {
        Self { initiator, round }
    }
}

impl fmt::Display for RoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.initiator, self.round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_round_id_next() {
        assert_eq!(RoundId::FIRST.next(), RoundId(1));
        assert_eq!(RoundId(41).next(), RoundId(42));
    }

    #[test]
    fn test_round_keys_distinct_across_initiators() {
        // Same sequence number, different initiators: two distinct rounds.
        let a = RoundKey::new(ParticipantId(0), RoundId(0));
        let b = RoundKey::new(ParticipantId(1), RoundId(0));
        assert_ne!(a, b);

        let keys: HashSet<_> = [a, b, a].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_display() {
        let key = RoundKey::new(ParticipantId(2), RoundId(3));
        assert_eq!(key.to_string(), "p2/r3");
    }

    #[test]
    fn test_all_participants() {
        let ids: Vec<_> = ParticipantId::all(3).collect();
        assert_eq!(ids, vec![ParticipantId(0), ParticipantId(1), ParticipantId(2)]);
        assert_eq!(ParticipantId::all(0).count(), 0);
    }

    #[test]
    fn test_all_clamps_oversized_count() {
        let last = ParticipantId::all(usize::MAX).last();
        assert_eq!(last, Some(ParticipantId(u32::MAX - 1)));
    }
}
