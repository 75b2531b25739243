//! Marker-based snapshot protocol.
//!
//! This crate implements the Chandy–Lamport marker protocol, together with
//! taint propagation, as a synchronous state machine per participant.
//!
//! # Architecture
//!
//! The participant state machine processes events synchronously:
//!
//! - `Event::SendRequested` → Stamp current taint on a data message, count it
//! - `Event::MessageReceived` (data) → Count it, absorb taint, account channel state
//! - `Event::MessageReceived` (marker) → Record on first marker, acknowledge on repeats
//! - `Event::SnapshotRequested` → Open a new round and broadcast markers
//!
//! A round is finished at a participant once every incoming channel has
//! delivered its marker. Its last published record is then final, and the
//! participant drops its bookkeeping for the round.
//!
//! All I/O is performed by the runner via returned `Action`s.

mod finished;
mod state;
mod tracker;

pub use finished::FinishedRounds;
pub use state::ParticipantState;
pub use tracker::RoundTracker;
