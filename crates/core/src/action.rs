//! Outbound actions returned by the participant state machine.

use cutline_types::{LocalRecord, Message, RoundKey};

/// Actions for the runner to perform, in the order returned.
///
/// Ordering matters: a [`Action::PublishRecord`] for a round always precedes
/// the marker sends for that round, so any participant that later sees one of
/// those markers can rely on the record already being visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Enqueue a message on the channel `message.sender -> message.recipient`.
    Send(Message),

    /// Publish a copy of this participant's record for a round.
    PublishRecord { key: RoundKey, record: LocalRecord },

    /// This participant initiated `key` and has collected every marker:
    /// close the round. Its records reach the snapshot sink once every one
    /// of them is final.
    FinalizeRound { key: RoundKey },
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Send(message) => message.type_name(),
            Action::PublishRecord { .. } => "PublishRecord",
            Action::FinalizeRound { .. } => "FinalizeRound",
        }
    }

    /// Check if this action puts a marker on a channel.
    pub fn is_marker_send(&self) -> bool {
        matches!(self, Action::Send(message) if message.marker_key().is_some())
    }
}
