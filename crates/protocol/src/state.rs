//! Participant state machine.

use crate::{FinishedRounds, RoundTracker};
use cutline_core::{Action, Event, StateMachine};
use cutline_types::{
    Message, MessageKind, ParticipantId, RoundId, RoundKey, Taint, TaintWitness, WitnessEvidence,
};
use indexmap::IndexMap;
use tracing::{debug, info};

/// Protocol state of a single participant.
///
/// Owned exclusively by that participant's actor. Other participants only
/// ever see copies of its round records, published through
/// [`Action::PublishRecord`].
pub struct ParticipantState {
    /// Our participant id.
    id: ParticipantId,

    /// Number of participants in the system.
    participants: usize,

    /// Live taint flag.
    taint: Taint,

    /// Data messages sent to each peer since start.
    sent: Vec<u64>,

    /// Data messages received from each peer since start.
    received: Vec<u64>,

    /// Open rounds, in the order we recorded them.
    rounds: IndexMap<RoundKey, RoundTracker>,

    /// Rounds finished here. Markers for these are ignored.
    finished: FinishedRounds,

    /// Sequence number for the next round we initiate.
    next_round: RoundId,
}

impl ParticipantState {
    /// Create a participant with zeroed counters.
    pub fn new(id: ParticipantId, participants: usize, taint: Taint) -> Self {
        Self {
            id,
            participants,
            taint,
            sent: vec![0; participants],
            received: vec![0; participants],
            rounds: IndexMap::new(),
            finished: FinishedRounds::new(),
            next_round: RoundId::FIRST,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get our participant id.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Get the current taint.
    pub fn taint(&self) -> Taint {
        self.taint
    }

    /// Get the live send counters.
    pub fn sent_counts(&self) -> &[u64] {
        &self.sent
    }

    /// Get the live receive counters.
    pub fn received_counts(&self) -> &[u64] {
        &self.received
    }

    /// Keys of all rounds currently open at this participant.
    pub fn open_rounds(&self) -> Vec<RoundKey> {
        self.rounds.keys().copied().collect()
    }

    /// Get the tracker for an open round.
    pub fn round(&self, key: &RoundKey) -> Option<&RoundTracker> {
        self.rounds.get(key)
    }

    /// Check if a round is finished at this participant.
    pub fn is_finished(&self, key: &RoundKey) -> bool {
        self.finished.contains(key)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Event handlers
    // ═══════════════════════════════════════════════════════════════════════════

    fn on_send(&mut self, to: ParticipantId) -> Vec<Action> {
        let Some(count) = self.sent.get_mut(to.index()) else {
            debug!(participant = %self.id, to = %to, "Send to unknown participant ignored");
            return vec![];
        };
        *count += 1;
        vec![Action::Send(Message::data(
            self.id,
            to,
            self.taint.is_tainted(),
        ))]
    }

    fn on_message(&mut self, message: Message) -> Vec<Action> {
        match message.kind {
            MessageKind::Data => self.on_data(message.sender, message.taint),
            MessageKind::Marker(key) => self.on_marker(key, message.sender, message.taint),
        }
    }

    fn on_data(&mut self, from: ParticipantId, taint: bool) -> Vec<Action> {
        let Some(count) = self.received.get_mut(from.index()) else {
            debug!(participant = %self.id, from = %from, "Data from unknown participant ignored");
            return vec![];
        };
        *count += 1;

        let flipped = self.taint.absorb(taint);
        if flipped {
            debug!(participant = %self.id, from = %from, "Taint absorbed");
        }

        let mut actions = Vec::new();
        for tracker in self.rounds.values_mut() {
            let mut changed = tracker.count_in_flight(from);
            if flipped {
                changed |= tracker.witness(TaintWitness {
                    peer: from,
                    evidence: WitnessEvidence::Message,
                });
            }
            if changed {
                actions.push(Action::PublishRecord {
                    key: tracker.key(),
                    record: tracker.to_record(),
                });
            }
        }
        actions
    }

    fn on_marker(&mut self, key: RoundKey, from: ParticipantId, taint: bool) -> Vec<Action> {
        if self.finished.contains(&key) {
            debug!(participant = %self.id, round = %key, from = %from, "Marker for finished round ignored");
            return vec![];
        }

        let Some(tracker) = self.rounds.get_mut(&key) else {
            debug!(participant = %self.id, round = %key, from = %from, "First marker");
            return self.open_round(key, Some(from));
        };

        if !tracker.acknowledge(from) {
            debug!(participant = %self.id, round = %key, from = %from, "Duplicate marker ignored");
            return vec![];
        }

        debug!(
            participant = %self.id,
            round = %key,
            from = %from,
            acknowledgments = tracker.acknowledgments(),
            "Marker acknowledged"
        );

        let witnessed = taint
            && !tracker.recorded_taint()
            && tracker.witness(TaintWitness {
                peer: from,
                evidence: WitnessEvidence::Marker,
            });
        let all_marked = tracker.all_channels_marked();

        let mut actions = Vec::new();
        // The last marker turns the record final, so it is published again
        if witnessed || all_marked {
            actions.push(Action::PublishRecord {
                key,
                record: tracker.to_record(),
            });
        }
        if all_marked {
            actions.extend(self.finish_round(key));
        }
        actions
    }

    fn on_snapshot(&mut self) -> Vec<Action> {
        let key = RoundKey::new(self.id, self.next_round);
        self.next_round = self.next_round.next();

        info!(participant = %self.id, round = %key, "Initiating snapshot");

        self.open_round(key, None)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Round lifecycle
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record local state for `key`, publish it, then broadcast markers.
    ///
    /// A round with no other incoming channel left to mark (N = 1, or N = 2
    /// away from the initiator) finishes straight away.
    fn open_round(&mut self, key: RoundKey, first_channel: Option<ParticipantId>) -> Vec<Action> {
        let tracker = RoundTracker::record(
            key,
            self.id,
            &self.sent,
            &self.received,
            self.taint.is_tainted(),
            first_channel,
        );

        info!(
            participant = %self.id,
            round = %key,
            sent = ?self.sent,
            received = ?self.received,
            taint = self.taint.is_tainted(),
            "Recorded local state"
        );

        let recorded_taint = tracker.recorded_taint();
        let all_marked = tracker.all_channels_marked();
        let mut actions = Vec::with_capacity(self.participants + 1);
        actions.push(Action::PublishRecord {
            key,
            record: tracker.to_record(),
        });
        actions.extend(
            ParticipantId::all(self.participants)
                .filter(|peer| *peer != self.id)
                .map(|peer| Action::Send(Message::marker(key, self.id, peer, recorded_taint))),
        );

        self.rounds.insert(key, tracker);
        if all_marked {
            actions.extend(self.finish_round(key));
        }
        actions
    }

    /// Drop bookkeeping for a round whose incoming channels are all marked.
    ///
    /// For the initiator this is the moment every other participant has
    /// acknowledged, so the round is finalized.
    fn finish_round(&mut self, key: RoundKey) -> Vec<Action> {
        self.rounds.shift_remove(&key);
        self.finished.insert(key);

        if key.initiator == self.id {
            info!(participant = %self.id, round = %key, "All markers collected, finalizing round");
            vec![Action::FinalizeRound { key }]
        } else {
            debug!(participant = %self.id, round = %key, "Round finished locally");
            vec![]
        }
    }
}

impl StateMachine for ParticipantState {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::SendRequested { to } => self.on_send(to),
            Event::MessageReceived(message) => self.on_message(message),
            Event::SnapshotRequested => self.on_snapshot(),
        }
    }
}
