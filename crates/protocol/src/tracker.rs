//! Per-round bookkeeping at a single participant.

use cutline_types::{LocalRecord, ParticipantId, RoundKey, TaintWitness};
use std::collections::BTreeSet;

/// Tracks one open round at one participant.
///
/// Created at the moment the participant fixes its local state for the round
/// (first marker, or its own `SNAPSHOT`). From then on it accumulates channel
/// state for every incoming channel whose marker has not arrived yet, and
/// counts acknowledging markers.
#[derive(Debug, Clone)]
pub struct RoundTracker {
    /// Round being tracked.
    key: RoundKey,
    /// Participant owning this tracker.
    owner: ParticipantId,
    /// Number of participants in the system.
    participants: usize,
    /// Send counters at the local cut.
    recorded_sent: Vec<u64>,
    /// Receive counters at the local cut.
    recorded_received: Vec<u64>,
    /// Taint at the local cut.
    recorded_taint: bool,
    /// Post-cut, pre-marker data per incoming channel.
    channel_in_flight: Vec<u64>,
    /// Incoming channels whose marker has arrived.
    marked: BTreeSet<ParticipantId>,
    /// Repeat markers seen (0..=N-1 at the initiator, 0..=N-2 elsewhere).
    acknowledgments: usize,
    /// First post-cut contamination evidence.
    taint_witness: Option<TaintWitness>,
}

impl RoundTracker {
    /// Fix the local state for `key`.
    ///
    /// Counters are copied, so later changes to the live counters never
    /// reach the recorded values.
    ///
    /// # Arguments
    ///
    /// * `key` - The round being recorded
    /// * `owner` - The recording participant
    /// * `sent` / `received` - Live per-peer counters to copy
    /// * `taint` - Live taint to copy
    /// * `first_channel` - Channel the triggering marker arrived on
    ///   (`None` for the initiator)
    pub fn record(
        key: RoundKey,
        owner: ParticipantId,
        sent: &[u64],
        received: &[u64],
        taint: bool,
        first_channel: Option<ParticipantId>,
    ) -> Self {
        let participants = sent.len();
        Self {
            key,
            owner,
            participants,
            recorded_sent: sent.to_vec(),
            recorded_received: received.to_vec(),
            recorded_taint: taint,
            channel_in_flight: vec![0; participants],
            marked: first_channel.into_iter().collect(),
            acknowledgments: 0,
            taint_witness: None,
        }
    }

    /// Get the round key.
    pub fn key(&self) -> RoundKey {
        self.key
    }

    /// Taint recorded at the local cut.
    pub fn recorded_taint(&self) -> bool {
        self.recorded_taint
    }

    /// Get the number of acknowledging markers counted so far.
    pub fn acknowledgments(&self) -> usize {
        self.acknowledgments
    }

    /// Get the current channel state for `peer`.
    pub fn in_flight(&self, peer: ParticipantId) -> u64 {
        self.channel_in_flight
            .get(peer.index())
            .copied()
            .unwrap_or(0)
    }

    /// Get the recorded witness, if any.
    pub fn taint_witness(&self) -> Option<TaintWitness> {
        self.taint_witness
    }

    /// Check if the marker from `peer` has arrived.
    pub fn is_marked(&self, peer: ParticipantId) -> bool {
        self.marked.contains(&peer)
    }

    /// Check if every incoming channel is closed for this round.
    ///
    /// At the initiator this means one acknowledging marker from each of the
    /// other N-1 participants.
    pub fn all_channels_marked(&self) -> bool {
        self.marked.len() + 1 >= self.participants
    }

    /// Count an acknowledging marker from `peer`.
    ///
    /// Returns false (and changes nothing) if `peer`'s channel was already
    /// marked, so a duplicate marker can never be counted twice.
    pub fn acknowledge(&mut self, peer: ParticipantId) -> bool {
        if peer == self.owner || !self.marked.insert(peer) {
            return false;
        }
        self.acknowledgments += 1;
        true
    }

    /// Count a data message from `peer` into the channel state.
    ///
    /// Returns true if counted, i.e. `peer`'s marker is still outstanding.
    pub fn count_in_flight(&mut self, peer: ParticipantId) -> bool {
        if self.is_marked(peer) {
            return false;
        }
        match self.channel_in_flight.get_mut(peer.index()) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    /// Keep `witness` if no witness was recorded yet. Returns true if kept.
    pub fn witness(&mut self, witness: TaintWitness) -> bool {
        if self.taint_witness.is_some() {
            return false;
        }
        self.taint_witness = Some(witness);
        true
    }

    /// Copy out the publishable record.
    pub fn to_record(&self) -> LocalRecord {
        LocalRecord {
            participant: self.owner,
            recorded_sent: self.recorded_sent.clone(),
            recorded_received: self.recorded_received.clone(),
            recorded_taint: self.recorded_taint,
            channel_in_flight: self.channel_in_flight.clone(),
            taint_witness: self.taint_witness,
            complete: self.all_channels_marked(),
        }
    }
}
