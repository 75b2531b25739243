//! Trace model and parser.

use crate::TraceError;
use cutline_types::{ParticipantId, ScriptedAction};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// One line of a trace: which participant performs which action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceStep {
    /// Participant that executes the action.
    pub participant: ParticipantId,
    /// The scripted action.
    pub action: ScriptedAction,
}

impl TraceStep {
    /// Create a trace step.
    pub fn new(participant: ParticipantId, action: ScriptedAction) -> Self {
        Self {
            participant,
            action,
        }
    }
}

/// A validated trace.
///
/// Construction (parsing or [`Trace::new`]) guarantees every participant and
/// peer id is in range and no participant sends to or receives from itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Number of participants.
    participants: usize,
    /// Participant whose taint starts set.
    tainted: ParticipantId,
    /// Globally ordered steps.
    steps: Vec<TraceStep>,
}

impl Trace {
    /// Build a trace from already-parsed steps, validating it.
    pub fn new(
        participants: usize,
        tainted: ParticipantId,
        steps: Vec<TraceStep>,
    ) -> Result<Self, TraceError> {
        validate_header(participants, tainted).map_err(|reason| TraceError::InvalidHeader {
            content: format!("{},{},{}", participants, steps.len(), tainted.0),
            reason,
        })?;
        for (index, step) in steps.iter().enumerate() {
            validate_step(step, participants).map_err(|reason| TraceError::InvalidAction {
                line: index + 2,
                reason,
            })?;
        }
        Ok(Self {
            participants,
            tainted,
            steps,
        })
    }

    /// Read and parse a trace file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trace: Trace = content.parse()?;
        debug!(
            path = %path.display(),
            participants = trace.participants,
            actions = trace.steps.len(),
            "Loaded trace"
        );
        Ok(trace)
    }

    /// Get the number of participants.
    pub fn participants(&self) -> usize {
        self.participants
    }

    /// Get the initially tainted participant.
    pub fn tainted(&self) -> ParticipantId {
        self.tainted
    }

    /// Get all steps in file order.
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// The actions `participant` executes, in file order.
    pub fn script_for(&self, participant: ParticipantId) -> Vec<ScriptedAction> {
        self.steps
            .iter()
            .filter(|step| step.participant == participant)
            .map(|step| step.action)
            .collect()
    }

    /// One script per participant, indexed by participant id.
    pub fn scripts(&self) -> Vec<Vec<ScriptedAction>> {
        ParticipantId::all(self.participants)
            .map(|id| self.script_for(id))
            .collect()
    }
}

impl FromStr for Trace {
    type Err = TraceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (_, header) = lines.next().ok_or(TraceError::Empty)?;
        let (participants, expected, tainted) =
            parse_header(header).map_err(|reason| TraceError::InvalidHeader {
                content: header.to_string(),
                reason,
            })?;

        let body: Vec<(usize, &str)> = lines.collect();
        if body.len() != expected {
            return Err(TraceError::ActionCount {
                expected,
                found: body.len(),
            });
        }

        let steps = body
            .into_iter()
            .map(|(line, text)| {
                let step = parse_step(line, text)?;
                validate_step(&step, participants)
                    .map_err(|reason| TraceError::InvalidAction { line, reason })?;
                Ok(step)
            })
            .collect::<Result<Vec<_>, TraceError>>()?;

        Ok(Self {
            participants,
            tainted,
            steps,
        })
    }
}

impl fmt::Display for Trace {
    /// Render back into the trace file format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{},{},{}",
            self.participants,
            self.steps.len(),
            self.tainted.0
        )?;
        for step in &self.steps {
            match step.action {
                ScriptedAction::Snapshot => writeln!(f, "{}:SNAPSHOT:0", step.participant.0)?,
                action => writeln!(f, "{}:{}", step.participant.0, action)?,
            }
        }
        Ok(())
    }
}

fn parse_header(header: &str) -> Result<(usize, usize, ParticipantId), String> {
    let fields: Vec<&str> = header.split(',').map(str::trim).collect();
    let [n, m, tainted] = fields.as_slice() else {
        return Err(format!("expected 3 comma-separated fields, found {}", fields.len()));
    };

    let participants: usize = n
        .parse()
        .map_err(|_| format!("participant count {:?} is not an unsigned integer", n))?;
    let actions: usize = m
        .parse()
        .map_err(|_| format!("action count {:?} is not an unsigned integer", m))?;
    let tainted: u32 = tainted
        .parse()
        .map_err(|_| format!("initiator id {:?} is not an unsigned integer", tainted))?;

    let tainted = ParticipantId(tainted);
    validate_header(participants, tainted)?;
    Ok((participants, actions, tainted))
}

fn validate_header(participants: usize, tainted: ParticipantId) -> Result<(), String> {
    if participants == 0 {
        return Err("participant count must be at least 1".to_string());
    }
    if participants > ParticipantId::MAX_PARTICIPANTS {
        return Err(format!(
            "participant count {} exceeds the maximum of {}",
            participants,
            ParticipantId::MAX_PARTICIPANTS
        ));
    }
    if tainted.index() >= participants {
        return Err(format!(
            "initiator id {} out of range for {} participants",
            tainted.0, participants
        ));
    }
    Ok(())
}

fn parse_step(line: usize, text: &str) -> Result<TraceStep, TraceError> {
    let invalid = |reason: String| TraceError::InvalidAction { line, reason };

    let mut fields = text.splitn(3, ':').map(str::trim);
    let (Some(id), Some(name)) = (fields.next(), fields.next()) else {
        return Err(invalid(format!(
            "expected participantId:ACTION:arg, found {:?}",
            text
        )));
    };
    let arg = fields.next().filter(|arg| !arg.is_empty());

    let participant = id
        .parse::<u32>()
        .map(ParticipantId)
        .map_err(|_| invalid(format!("participant id {:?} is not an unsigned integer", id)))?;

    let peer = |arg: Option<&str>| -> Result<ParticipantId, TraceError> {
        let arg = arg.ok_or_else(|| invalid(format!("{} requires a peer id", name)))?;
        arg.parse::<u32>()
            .map(ParticipantId)
            .map_err(|_| invalid(format!("peer id {:?} is not an unsigned integer", arg)))
    };

    let action = match name {
        "SEND" => ScriptedAction::Send { to: peer(arg)? },
        "RECEIVE" => ScriptedAction::Receive { from: peer(arg)? },
        "WAIT" => {
            let arg = arg.ok_or_else(|| invalid("WAIT requires a duration".to_string()))?;
            let seconds = arg
                .parse::<u64>()
                .map_err(|_| invalid(format!("wait duration {:?} is not an unsigned integer", arg)))?;
            ScriptedAction::Wait { seconds }
        }
        "SNAPSHOT" => ScriptedAction::Snapshot,
        other => {
            return Err(TraceError::UnknownAction {
                line,
                name: other.to_string(),
            })
        }
    };

    Ok(TraceStep::new(participant, action))
}

fn validate_step(step: &TraceStep, participants: usize) -> Result<(), String> {
    if step.participant.index() >= participants {
        return Err(format!(
            "participant {} out of range for {} participants",
            step.participant.0, participants
        ));
    }
    let peer = match step.action {
        ScriptedAction::Send { to } => to,
        ScriptedAction::Receive { from } => from,
        ScriptedAction::Wait { .. } | ScriptedAction::Snapshot => return Ok(()),
    };
    if peer.index() >= participants {
        return Err(format!(
            "peer {} out of range for {} participants",
            peer.0, participants
        ));
    }
    if peer == step.participant {
        return Err(format!(
            "participant {} cannot {} itself",
            peer.0,
            step.action.name()
        ));
    }
    Ok(())
}
