//! Record board: the copy-on-publish hand-off between participants.
//!
//! Participants never read each other's live state. Instead each one
//! publishes a copy of its round record whenever it changes. The initiator
//! finalizes the round once it holds every acknowledging marker, but the
//! records only leave the board when each of them is final: its owner has
//! seen every incoming marker for the round, or has retired.

use cutline_types::{LocalRecord, ParticipantId, RoundKey, SnapshotRecordSet};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct PendingRound {
    /// Latest published record per participant.
    records: BTreeMap<ParticipantId, LocalRecord>,
    /// The initiator has collected every marker.
    finalized: bool,
}

#[derive(Debug, Default)]
struct BoardState {
    /// Rounds not yet handed off.
    rounds: HashMap<RoundKey, PendingRound>,
    /// Participants whose task has ended. Their records are final as they are.
    retired: HashSet<ParticipantId>,
}

/// Shared store of published round records.
#[derive(Debug)]
pub struct RecordBoard {
    participants: usize,
    state: Mutex<BoardState>,
}

impl RecordBoard {
    /// Create an empty board for `participants` participants.
    pub fn new(participants: usize) -> Self {
        Self {
            participants,
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Publish (or replace) a participant's record.
    ///
    /// Returns the round's record set if this record was the last one the
    /// finalized round was waiting for.
    pub fn publish(&self, key: RoundKey, record: LocalRecord) -> Option<SnapshotRecordSet> {
        let mut state = self.state.lock();
        state
            .rounds
            .entry(key)
            .or_default()
            .records
            .insert(record.participant, record);
        self.take_if_ready(&mut state, key)
    }

    /// Mark a round finalized by its initiator.
    ///
    /// Returns the record set if every record is already final. Otherwise the
    /// set is returned later by the [`publish`](Self::publish) or
    /// [`retire`](Self::retire) call that completes it. Either way a round is
    /// handed out at most once.
    pub fn finalize(&self, key: RoundKey) -> Option<SnapshotRecordSet> {
        let mut state = self.state.lock();
        let Some(round) = state.rounds.get_mut(&key) else {
            warn!(round = %key, "Finalize for unknown or handed-off round");
            return None;
        };
        if round.finalized {
            warn!(round = %key, "Round already finalized");
            return None;
        }
        round.finalized = true;
        self.take_if_ready(&mut state, key)
    }

    /// Record that `participant`'s task has ended.
    ///
    /// Its published records are final from now on. Returns every finalized
    /// round that this completes, ordered by key.
    pub fn retire(&self, participant: ParticipantId) -> Vec<SnapshotRecordSet> {
        let mut state = self.state.lock();
        state.retired.insert(participant);

        let mut keys: Vec<_> = state
            .rounds
            .iter()
            .filter(|(_, round)| round.finalized)
            .map(|(key, _)| *key)
            .collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|key| self.take_if_ready(&mut state, key))
            .collect()
    }

    /// Rounds with published records that were never handed off.
    pub fn open_rounds(&self) -> Vec<RoundKey> {
        let mut keys: Vec<_> = self.state.lock().rounds.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Check if the initiator has finalized a round that is still waiting
    /// for final records.
    pub fn is_pending(&self, key: &RoundKey) -> bool {
        self.state
            .lock()
            .rounds
            .get(key)
            .is_some_and(|round| round.finalized)
    }

    fn take_if_ready(&self, state: &mut BoardState, key: RoundKey) -> Option<SnapshotRecordSet> {
        let round = state.rounds.get(&key)?;
        if !round.finalized {
            return None;
        }
        let waiting = ParticipantId::all(self.participants)
            .filter(|id| {
                !state.retired.contains(id)
                    && !round.records.get(id).is_some_and(|record| record.complete)
            })
            .count();
        if waiting > 0 {
            debug!(round = %key, waiting, "Round waiting for final records");
            return None;
        }

        let round = state.rounds.remove(&key)?;
        Some(SnapshotRecordSet {
            key,
            records: round.records.into_values().collect(),
        })
    }
}
