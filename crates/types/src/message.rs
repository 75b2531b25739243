//! Channel traffic.

use crate::{ParticipantId, RoundKey};
use serde::{Deserialize, Serialize};

/// What a message on a channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// Application data produced by a scripted `SEND`.
    Data,
    /// Snapshot marker for the given round.
    Marker(RoundKey),
}

/// A single message travelling on the channel `sender -> recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Data or marker.
    pub kind: MessageKind,
    /// Participant that enqueued the message.
    pub sender: ParticipantId,
    /// Participant the channel delivers to.
    pub recipient: ParticipantId,
    /// For data: the sender's taint at send time.
    /// For markers: the sender's recorded taint for the round (taint evidence).
    pub taint: bool,
}

impl Message {
    /// Build a data message.
    pub fn data(sender: ParticipantId, recipient: ParticipantId, taint: bool) -> Self {
        Self {
            kind: MessageKind::Data,
            sender,
            recipient,
            taint,
        }
    }

    /// Build a marker for `key`.
    pub fn marker(
        key: RoundKey,
        sender: ParticipantId,
        recipient: ParticipantId,
        taint: bool,
    ) -> Self {
        Self {
            kind: MessageKind::Marker(key),
            sender,
            recipient,
            taint,
        }
    }

    /// Get a human-readable name for this message type.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            MessageKind::Data => "Data",
            MessageKind::Marker(_) => "Marker",
        }
    }

    /// Round key if this is a marker.
    pub fn marker_key(&self) -> Option<RoundKey> {
        match self.kind {
            MessageKind::Data => None,
            MessageKind::Marker(key) => Some(key),
        }
    }
}
