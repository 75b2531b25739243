//! File-backed sink.
//!
//! Writes one artifact per finalized round into an output directory, named
//! after the round: `snapshot_p{initiator}_r{round}.txt` (or `.json`).

use crate::{SinkError, SnapshotSink};
use cutline_types::{RoundKey, SnapshotRecordSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk encoding of a snapshot artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Human-readable, one block per participant.
    #[default]
    Text,

    /// Pretty-printed JSON of the whole record set.
    Json,
}

impl SnapshotFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Text => "txt",
            SnapshotFormat::Json => "json",
        }
    }
}

/// Writes each finalized round to its own file.
#[derive(Clone, Debug)]
pub struct FileSnapshotSink {
    /// Directory the artifacts are written to.
    dir: PathBuf,

    /// Encoding used for every artifact.
    format: SnapshotFormat,
}

impl FileSnapshotSink {
    /// Create a sink writing text artifacts into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: SnapshotFormat::default(),
        }
    }

    /// Set the artifact format.
    pub fn with_format(mut self, format: SnapshotFormat) -> Self {
        self.format = format;
        self
    }

    /// Get the output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the artifact for `key` is written to.
    pub fn path_for(&self, key: RoundKey) -> PathBuf {
        self.dir.join(format!(
            "snapshot_p{}_r{}.{}",
            key.initiator.0,
            key.round.0,
            self.format.extension()
        ))
    }

    fn encode(&self, set: &SnapshotRecordSet) -> Result<String, SinkError> {
        match self.format {
            SnapshotFormat::Text => Ok(render_text(set)),
            SnapshotFormat::Json => {
                let mut json = serde_json::to_string_pretty(set)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

impl SnapshotSink for FileSnapshotSink {
    fn record(&self, set: &SnapshotRecordSet) -> Result<(), SinkError> {
        let path = self.path_for(set.key);
        let content = self.encode(set)?;

        std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;
        std::fs::write(&path, content).map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;

        info!(round = %set.key, path = %path.display(), "Snapshot written");
        Ok(())
    }
}

/// Render a record set in the text format.
///
/// ```text
/// round p0/r0
/// participant 0:
///   recorded_sent: [0, 1, 0]
///   recorded_received: [0, 0, 0]
///   recorded_taint: true
///   channel_in_flight: [0, 0, 0]
///   taint_witness: none
///   complete: true
/// ```
pub fn render_text(set: &SnapshotRecordSet) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "round {}", set.key);
    for record in &set.records {
        let _ = writeln!(out, "participant {}:", record.participant.0);
        let _ = writeln!(out, "  recorded_sent: {:?}", record.recorded_sent);
        let _ = writeln!(out, "  recorded_received: {:?}", record.recorded_received);
        let _ = writeln!(out, "  recorded_taint: {}", record.recorded_taint);
        let _ = writeln!(out, "  channel_in_flight: {:?}", record.channel_in_flight);
        match record.taint_witness {
            Some(witness) => {
                let _ = writeln!(out, "  taint_witness: {}", witness);
            }
            None => {
                let _ = writeln!(out, "  taint_witness: none");
            }
        }
        let _ = writeln!(out, "  complete: {}", record.complete);
    }
    out
}
