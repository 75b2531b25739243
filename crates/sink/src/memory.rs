//! In-memory sink.

use crate::{SinkError, SnapshotSink};
use cutline_types::{RoundKey, SnapshotRecordSet};
use parking_lot::Mutex;

/// Collects finalized rounds in memory, in finalization order.
#[derive(Debug, Default)]
pub struct MemorySnapshotSink {
    sets: Mutex<Vec<SnapshotRecordSet>>,
}

impl MemorySnapshotSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every set recorded so far.
    pub fn sets(&self) -> Vec<SnapshotRecordSet> {
        self.sets.lock().clone()
    }

    /// Recorded set for a round, if it was finalized.
    pub fn get(&self, key: RoundKey) -> Option<SnapshotRecordSet> {
        self.sets.lock().iter().find(|set| set.key == key).cloned()
    }

    /// Get the number of recorded rounds.
    pub fn len(&self) -> usize {
        self.sets.lock().len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.sets.lock().is_empty()
    }
}

impl SnapshotSink for MemorySnapshotSink {
    fn record(&self, set: &SnapshotRecordSet) -> Result<(), SinkError> {
        self.sets.lock().push(set.clone());
        Ok(())
    }
}
