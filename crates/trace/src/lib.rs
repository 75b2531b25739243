//! Trace loading.
//!
//! A trace is a text file describing the participant count, the initially
//! tainted participant and a globally ordered list of scripted actions:
//!
//! ```text
//! 3,4,0
//! 0:SEND:1
//! 1:RECEIVE:0
//! 0:SNAPSHOT:0
//! 2:WAIT:1
//! ```
//!
//! Each participant replays only its own lines, in file order.

mod error;
mod trace;

pub use error::TraceError;
pub use trace::{Trace, TraceStep};
