//! Concurrent snapshot simulation runner.
//!
//! Replays a [`Trace`](cutline_trace::Trace) with one tokio task per
//! participant. Tasks talk only through the channel fabric; round records
//! are shared through the record board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐   │
//! │  │ Actor p0     │  │ Actor p1     │  │ Actor pN-1   │   │
//! │  │ script +     │  │ script +     │  │ script +     │   │
//! │  │ Participant- │  │ Participant- │  │ Participant- │   │
//! │  │ State        │  │ State        │  │ State        │   │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘   │
//! │         │   FIFO channel per ordered pair   │           │
//! │         └────────── ChannelFabric ──────────┘           │
//! │                           │                             │
//! │  ┌────────────────────────▼───────────────────────────┐ │
//! │  │  RecordBoard: published records, pending hand-offs │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           ▼                             │
//! │                     SnapshotSink                        │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod actor;
mod board;
mod config;
mod error;
mod fabric;
mod runner;

pub use actor::{ParticipantActor, ParticipantReport};
pub use board::RecordBoard;
pub use config::SimulationConfig;
pub use error::{FabricError, SimulationError};
pub use fabric::{ChannelFabric, Endpoint};
pub use runner::{SimulationReport, SimulationRunner};
