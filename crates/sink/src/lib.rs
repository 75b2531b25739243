//! Snapshot sinks.
//!
//! A sink receives the [`SnapshotRecordSet`](cutline_types::SnapshotRecordSet)
//! of every finalized round, exactly once per round.

mod error;
mod file;
mod memory;

pub use error::SinkError;
pub use file::{render_text, FileSnapshotSink, SnapshotFormat};
pub use memory::MemorySnapshotSink;

use cutline_types::SnapshotRecordSet;

/// Destination for finalized snapshot rounds.
///
/// Called once per round, when the initiator has finalized it and every
/// participant's record is final. Calls run on tokio's blocking pool, so an
/// implementation may block on I/O. A failure is reported but never retried.
pub trait SnapshotSink: Send + Sync {
    /// Persist one round's records.
    fn record(&self, set: &SnapshotRecordSet) -> Result<(), SinkError>;
}
