//! Inbound events for the participant state machine.

use cutline_types::{Message, ParticipantId};

/// Events a participant state machine processes.
///
/// Every event is produced by the participant's own actor, in script order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The script reached `SEND:to`.
    SendRequested { to: ParticipantId },

    /// A message was dequeued from the channel `message.sender -> self`.
    MessageReceived(Message),

    /// The script reached `SNAPSHOT`.
    SnapshotRequested,
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::SendRequested { .. } => "SendRequested",
            Event::MessageReceived(_) => "MessageReceived",
            Event::SnapshotRequested => "SnapshotRequested",
        }
    }
}
