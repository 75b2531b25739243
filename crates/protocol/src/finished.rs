//! Rounds a participant is done with.

use cutline_types::{ParticipantId, RoundId, RoundKey};
use std::collections::{BTreeSet, HashMap};

/// Per-initiator low watermark plus the finished rounds above it.
#[derive(Debug, Clone)]
struct Watermark {
    /// Every round below this one is finished.
    below: RoundId,
    /// Finished rounds at or above `below`.
    above: BTreeSet<RoundId>,
}

impl Default for Watermark {
    fn default() -> Self {
        Self {
            below: RoundId::FIRST,
            above: BTreeSet::new(),
        }
    }
}

/// Set of finished rounds, compacted per initiator.
///
/// Initiators number their rounds from zero and rounds mostly finish in
/// order, so each initiator's entry collapses into a single watermark and
/// stays small for long traces.
#[derive(Debug, Clone, Default)]
pub struct FinishedRounds {
    by_initiator: HashMap<ParticipantId, Watermark>,
}

impl FinishedRounds {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` finished.
    pub fn insert(&mut self, key: RoundKey) {
        let mark = self.by_initiator.entry(key.initiator).or_default();
        if key.round < mark.below {
            return;
        }
        mark.above.insert(key.round);
        while mark.above.remove(&mark.below) {
            mark.below = mark.below.next();
        }
    }

    /// Check if `key` was marked finished.
    pub fn contains(&self, key: &RoundKey) -> bool {
        self.by_initiator
            .get(&key.initiator)
            .is_some_and(|mark| key.round < mark.below || mark.above.contains(&key.round))
    }

    /// Number of rounds held individually above the watermarks.
    pub fn pending(&self) -> usize {
        self.by_initiator.values().map(|mark| mark.above.len()).sum()
    }
}
