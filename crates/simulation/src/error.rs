//! Error types for the simulation runner.

use cutline_types::ParticipantId;
use thiserror::Error;

/// Errors on the channel fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FabricError {
    /// No channel exists between the pair (self-channel or out of range).
    #[error("no channel from {from} to {to}")]
    NoChannel { from: ParticipantId, to: ParticipantId },

    /// The other end of the channel is gone: the peer finished its script.
    #[error("channel from {from} to {to} is disconnected")]
    Disconnected { from: ParticipantId, to: ParticipantId },
}

/// Errors that prevent a simulation from running to completion.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A participant task panicked or was cancelled.
    #[error("participant task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
