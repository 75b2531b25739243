//! Error types for snapshot sinks.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while persisting a snapshot round.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing the snapshot artifact failed.
    #[error("failed to write snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Encoding the record set failed.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}
