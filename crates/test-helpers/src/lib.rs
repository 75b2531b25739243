//! Test helpers: build traces in code instead of files.
//!
//! ```ignore
//! let trace = TraceBuilder::new(3)
//!     .tainted(0)
//!     .send(0, 1)
//!     .receive(1, 0)
//!     .snapshot(0)
//!     .build();
//! ```

use cutline_trace::{Trace, TraceError, TraceStep};
use cutline_types::{ParticipantId, ScriptedAction};

/// Shorthand for a participant id.
pub fn p(id: u32) -> ParticipantId {
    ParticipantId(id)
}

/// Fluent builder for [`Trace`]s. Steps are kept in call order.
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    participants: usize,
    tainted: ParticipantId,
    steps: Vec<TraceStep>,
}

impl TraceBuilder {
    /// Start a trace for `participants` participants, with p0 tainted.
    pub fn new(participants: usize) -> Self {
        Self {
            participants,
            tainted: ParticipantId(0),
            steps: Vec::new(),
        }
    }

    /// Set the initially tainted participant.
    pub fn tainted(mut self, id: u32) -> Self {
        self.tainted = p(id);
        self
    }

    /// `from:SEND:to`
    pub fn send(self, from: u32, to: u32) -> Self {
        self.step(from, ScriptedAction::Send { to: p(to) })
    }

    /// `at:RECEIVE:from`
    pub fn receive(self, at: u32, from: u32) -> Self {
        self.step(at, ScriptedAction::Receive { from: p(from) })
    }

    /// `at:WAIT:seconds`
    pub fn wait(self, at: u32, seconds: u64) -> Self {
        self.step(at, ScriptedAction::Wait { seconds })
    }

    /// `at:SNAPSHOT:0`
    pub fn snapshot(self, at: u32) -> Self {
        self.step(at, ScriptedAction::Snapshot)
    }

    /// `at:RECEIVE:from` for each `from`, in order.
    pub fn receive_all(self, at: u32, from: &[u32]) -> Self {
        from.iter().fold(self, |builder, &peer| builder.receive(at, peer))
    }

    fn step(mut self, at: u32, action: ScriptedAction) -> Self {
        self.steps.push(TraceStep::new(p(at), action));
        self
    }

    /// Validate and build the trace.
    pub fn try_build(self) -> Result<Trace, TraceError> {
        Trace::new(self.participants, self.tainted, self.steps)
    }

    /// Build the trace, panicking if it is invalid.
    pub fn build(self) -> Trace {
        match self.try_build() {
            Ok(trace) => trace,
            Err(e) => panic!("invalid test trace: {}", e),
        }
    }
}
