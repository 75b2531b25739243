//! Error types for trace loading.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or validating a trace.
///
/// Line numbers are 1-based; the header is line 1.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be read.
    #[error("failed to read trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input has no header line.
    #[error("trace is empty")]
    Empty,

    /// The header line is not `N,M,initiatorId`.
    #[error("invalid header {content:?}: {reason}")]
    InvalidHeader { content: String, reason: String },

    /// An action line names an action outside SEND/RECEIVE/WAIT/SNAPSHOT.
    #[error("line {line}: unknown action {name:?}")]
    UnknownAction { line: usize, name: String },

    /// An action line is malformed or refers to an invalid participant.
    #[error("line {line}: {reason}")]
    InvalidAction { line: usize, reason: String },

    /// The number of action lines does not match the header.
    #[error("header declares {expected} actions but trace contains {found}")]
    ActionCount { expected: usize, found: usize },
}
