//! Simulation runner.

use crate::{
    ChannelFabric, ParticipantActor, ParticipantReport, RecordBoard, SimulationConfig,
    SimulationError,
};
use cutline_protocol::ParticipantState;
use cutline_sink::SnapshotSink;
use cutline_trace::Trace;
use cutline_types::{ParticipantId, RoundKey, Taint};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, info_span, warn, Instrument};

/// Results of a completed simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// Per-participant outcome, ordered by participant id.
    pub participants: Vec<ParticipantReport>,
    /// Rounds handed to the sink, ordered by key.
    pub completed_rounds: Vec<RoundKey>,
    /// Rounds whose sink write failed, ordered by key.
    pub failed_rounds: Vec<(RoundKey, String)>,
    /// Rounds that recorded state but were never handed to the sink.
    pub unfinished_rounds: Vec<RoundKey>,
}

impl SimulationReport {
    /// Get the report of one participant.
    pub fn participant(&self, id: ParticipantId) -> Option<&ParticipantReport> {
        self.participants.iter().find(|r| r.participant == id)
    }

    /// Participants that abandoned their script early.
    pub fn stopped(&self) -> impl Iterator<Item = &ParticipantReport> {
        self.participants.iter().filter(|r| r.stopped.is_some())
    }
}

/// Runs one trace to completion.
///
/// Spawns one task per participant, all at once, and waits for every task.
/// A participant blocked on a receive that its (still running) peer never
/// satisfies blocks forever, and so does the run.
pub struct SimulationRunner {
    config: SimulationConfig,
    trace: Trace,
    sink: Arc<dyn SnapshotSink>,
}

impl SimulationRunner {
    /// Create a runner for `trace`, writing finalized rounds to `sink`.
    pub fn new(config: SimulationConfig, trace: Trace, sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            config,
            trace,
            sink,
        }
    }

    /// Run every participant's script and collect the outcome.
    pub async fn run(self) -> Result<SimulationReport, SimulationError> {
        if self.config.channel_capacity == 0 {
            return Err(SimulationError::Config(
                "channel capacity must be at least 1".to_string(),
            ));
        }

        let participants = self.trace.participants();
        info!(
            participants,
            actions = self.trace.steps().len(),
            tainted = %self.trace.tainted(),
            "Starting simulation"
        );

        let board = Arc::new(RecordBoard::new(participants));
        let endpoints = ChannelFabric::new(participants, self.config.channel_capacity)
            .into_endpoints();

        let mut tasks = JoinSet::new();
        for (endpoint, script) in endpoints.into_iter().zip(self.trace.scripts()) {
            let id = endpoint.id();
            let taint = if id == self.trace.tainted() {
                Taint::TAINTED
            } else {
                Taint::CLEAN
            };
            let actor = ParticipantActor::new(
                ParticipantState::new(id, participants, taint),
                endpoint,
                script,
                board.clone(),
                self.sink.clone(),
                self.config.clone(),
            );
            tasks.spawn(actor.run().instrument(info_span!("participant", id = %id)));
        }

        let mut reports = Vec::with_capacity(participants);
        while let Some(result) = tasks.join_next().await {
            reports.push(result?);
        }
        reports.sort_by_key(|r| r.participant);

        let mut completed_rounds: Vec<_> = reports
            .iter()
            .flat_map(|r| r.completed_rounds.iter().copied())
            .collect();
        completed_rounds.sort();
        let mut failed_rounds: Vec<_> = reports
            .iter()
            .flat_map(|r| r.failed_rounds.iter().cloned())
            .collect();
        failed_rounds.sort();
        let unfinished_rounds = board.open_rounds();

        for report in reports.iter().filter(|r| r.stopped.is_some()) {
            warn!(
                participant = %report.participant,
                completed = report.actions_completed,
                total = report.actions_total,
                "Participant did not finish its script"
            );
        }
        for key in &unfinished_rounds {
            warn!(round = %key, "Round never completed");
        }
        info!(
            completed = completed_rounds.len(),
            failed = failed_rounds.len(),
            unfinished = unfinished_rounds.len(),
            "Simulation finished"
        );

        Ok(SimulationReport {
            participants: reports,
            completed_rounds,
            failed_rounds,
            unfinished_rounds,
        })
    }
}
