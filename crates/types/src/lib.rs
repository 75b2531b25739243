//! Core types for the cutline snapshot simulator.
//!
//! Everything here is plain data shared between the protocol state machine,
//! the trace loader, the snapshot sinks and the simulation runner:
//!
//! - [`ParticipantId`], [`RoundId`], [`RoundKey`]: identifiers
//! - [`Message`] / [`MessageKind`]: channel traffic (data and markers)
//! - [`ScriptedAction`]: one step of a participant's replay script
//! - [`Taint`]: the monotone contamination flag
//! - [`LocalRecord`] / [`SnapshotRecordSet`]: recorded snapshot state

mod identifiers;
mod message;
mod script;
mod snapshot;
mod taint;

pub use identifiers::{ParticipantId, RoundId, RoundKey};
pub use message::{Message, MessageKind};
pub use script::ScriptedAction;
pub use snapshot::{LocalRecord, SnapshotRecordSet, TaintWitness, WitnessEvidence};
pub use taint::Taint;
