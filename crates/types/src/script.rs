//! Scripted participant actions.

use crate::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a participant's replay script.
///
/// The internal marker "action" is not part of this enum: markers are only
/// ever produced by the protocol, never scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptedAction {
    /// Send a data message to `to`.
    Send { to: ParticipantId },
    /// Dequeue the next message on the channel from `from`.
    Receive { from: ParticipantId },
    /// Suspend this participant for `seconds` wait units.
    Wait { seconds: u64 },
    /// Start a new snapshot round with this participant as initiator.
    Snapshot,
}

impl ScriptedAction {
    /// Name of the action as it appears in a trace file.
    pub fn name(&self) -> &'static str {
        match self {
            ScriptedAction::Send { .. } => "SEND",
            ScriptedAction::Receive { .. } => "RECEIVE",
            ScriptedAction::Wait { .. } => "WAIT",
            ScriptedAction::Snapshot => "SNAPSHOT",
        }
    }
}

impl fmt::Display for ScriptedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptedAction::Send { to } => write!(f, "SEND:{}", to.0),
            ScriptedAction::Receive { from } => write!(f, "RECEIVE:{}", from.0),
            ScriptedAction::Wait { seconds } => write!(f, "WAIT:{}", seconds),
            ScriptedAction::Snapshot => write!(f, "SNAPSHOT"),
        }
    }
}
