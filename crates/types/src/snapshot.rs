//! Recorded snapshot state.
//!
//! A [`LocalRecord`] is the round-scoped state one participant publishes for a
//! round; a [`SnapshotRecordSet`] is what reaches the snapshot sink once the
//! initiator has closed the round and every record is final.

use crate::{ParticipantId, RoundKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a taint witness was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WitnessEvidence {
    /// A data message received after the local cut flipped our taint.
    Message,
    /// A marker showed the peer was tainted at its cut while we were not.
    Marker,
}

/// Which peer first showed contamination relative to the local cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintWitness {
    /// Peer the evidence came from.
    pub peer: ParticipantId,
    /// Kind of evidence.
    pub evidence: WitnessEvidence,
}

impl fmt::Display for TaintWitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.evidence {
            WitnessEvidence::Message => "message",
            WitnessEvidence::Marker => "marker",
        };
        write!(f, "{} ({})", self.peer, kind)
    }
}

/// One participant's recorded state for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Whose state this is.
    pub participant: ParticipantId,
    /// Messages sent to each peer, as of the local cut.
    pub recorded_sent: Vec<u64>,
    /// Messages received from each peer, as of the local cut.
    pub recorded_received: Vec<u64>,
    /// Taint at the local cut.
    pub recorded_taint: bool,
    /// Data received on each incoming channel after the cut and before that
    /// channel's marker.
    pub channel_in_flight: Vec<u64>,
    /// First post-cut contamination evidence, if any.
    pub taint_witness: Option<TaintWitness>,
    /// Every incoming channel's marker had arrived, so the channel states are
    /// final. False only if the participant stopped before that.
    pub complete: bool,
}

impl LocalRecord {
    /// Total messages recorded as in flight towards this participant.
    pub fn in_flight_total(&self) -> u64 {
        self.channel_in_flight.iter().sum()
    }
}

/// The records of every participant for one completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecordSet {
    /// The round these records belong to.
    pub key: RoundKey,
    /// One record per participant, ordered by participant id.
    pub records: Vec<LocalRecord>,
}

impl SnapshotRecordSet {
    /// Record of a specific participant.
    pub fn record(&self, participant: ParticipantId) -> Option<&LocalRecord> {
        self.records.iter().find(|r| r.participant == participant)
    }

    /// Number of participants covered.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoundId;

    fn record(id: u32, in_flight: Vec<u64>) -> LocalRecord {
        LocalRecord {
            participant: ParticipantId(id),
            recorded_sent: vec![0; in_flight.len()],
            recorded_received: vec![0; in_flight.len()],
            recorded_taint: false,
            channel_in_flight: in_flight,
            taint_witness: None,
            complete: true,
        }
    }

    #[test]
    fn test_record_lookup() {
        let set = SnapshotRecordSet {
            key: RoundKey::new(ParticipantId(0), RoundId(0)),
            records: vec![record(0, vec![0, 2]), record(1, vec![1, 0])],
        };

        assert_eq!(set.len(), 2);
        assert_eq!(set.record(ParticipantId(0)).map(|r| r.in_flight_total()), Some(2));
        assert_eq!(set.record(ParticipantId(1)).map(|r| r.in_flight_total()), Some(1));
        assert!(set.record(ParticipantId(2)).is_none());
    }

    #[test]
    fn test_record_set_json_shape() {
        let set = SnapshotRecordSet {
            key: RoundKey::new(ParticipantId(1), RoundId(2)),
            records: vec![LocalRecord {
                taint_witness: Some(TaintWitness {
                    peer: ParticipantId(0),
                    evidence: WitnessEvidence::Message,
                }),
                ..record(1, vec![0, 0])
            }],
        };

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["key"]["initiator"], 1);
        assert_eq!(json["key"]["round"], 2);
        assert_eq!(json["records"][0]["taint_witness"]["peer"], 0);
        assert_eq!(json["records"][0]["taint_witness"]["evidence"], "Message");
        assert_eq!(json["records"][0]["complete"], true);
    }
}
