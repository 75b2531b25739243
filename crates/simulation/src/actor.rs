//! Participant actor: replays one participant's script.

use crate::{Endpoint, FabricError, RecordBoard, SimulationConfig};
use cutline_core::{Action, Event, StateMachine};
use cutline_protocol::ParticipantState;
use cutline_sink::SnapshotSink;
use cutline_types::{ParticipantId, RoundKey, ScriptedAction, SnapshotRecordSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of one participant's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantReport {
    /// Participant id.
    pub participant: ParticipantId,
    /// Taint at the end of the run.
    pub taint: bool,
    /// Data messages sent to each peer.
    pub sent: Vec<u64>,
    /// Data messages received from each peer.
    pub received: Vec<u64>,
    /// Scripted actions executed.
    pub actions_completed: usize,
    /// Scripted actions in the participant's script.
    pub actions_total: usize,
    /// Rounds this participant's task handed to the sink.
    pub completed_rounds: Vec<RoundKey>,
    /// Rounds this participant's task handed to the sink whose write failed.
    pub failed_rounds: Vec<(RoundKey, String)>,
    /// Why the script was abandoned early, if it was.
    pub stopped: Option<String>,
}

/// Drives one [`ParticipantState`] through its script.
///
/// Each action is completed, including any blocking on the fabric, before
/// the next one starts. Whichever task makes a finalized round's records
/// all final hands the round to the sink: the initiator, the participant
/// publishing the last final record, or a participant retiring.
pub struct ParticipantActor {
    state: ParticipantState,
    endpoint: Endpoint,
    script: Vec<ScriptedAction>,
    /// Index of the next scripted action.
    next_action: usize,
    board: Arc<RecordBoard>,
    sink: Arc<dyn SnapshotSink>,
    config: SimulationConfig,
    completed_rounds: Vec<RoundKey>,
    failed_rounds: Vec<(RoundKey, String)>,
}

impl ParticipantActor {
    /// Create an actor for the endpoint's participant.
    pub fn new(
        state: ParticipantState,
        endpoint: Endpoint,
        script: Vec<ScriptedAction>,
        board: Arc<RecordBoard>,
        sink: Arc<dyn SnapshotSink>,
        config: SimulationConfig,
    ) -> Self {
        Self {
            state,
            endpoint,
            script,
            next_action: 0,
            board,
            sink,
            config,
            completed_rounds: Vec::new(),
            failed_rounds: Vec::new(),
        }
    }

    /// Get the participant id.
    pub fn id(&self) -> ParticipantId {
        self.state.id()
    }

    /// Run the whole script, then retire from the board.
    ///
    /// A receive on a channel whose peer has finished stops the script; the
    /// remaining actions are abandoned and reported.
    pub async fn run(mut self) -> ParticipantReport {
        let mut stopped = None;

        while let Some(action) = self.script.get(self.next_action).copied() {
            debug!(participant = %self.id(), step = self.next_action, action = %action, "Executing");
            if let Err(e) = self.execute(action).await {
                warn!(
                    participant = %self.id(),
                    step = self.next_action,
                    action = %action,
                    error = %e,
                    "Participant stopped"
                );
                stopped = Some(format!("{} at step {}: {}", action, self.next_action, e));
                break;
            }
            self.next_action += 1;
        }

        if stopped.is_none() {
            debug!(participant = %self.id(), actions = self.script.len(), "Script complete");
        }

        for set in self.board.retire(self.id()) {
            self.hand_off(set).await;
        }

        ParticipantReport {
            participant: self.state.id(),
            taint: self.state.taint().is_tainted(),
            sent: self.state.sent_counts().to_vec(),
            received: self.state.received_counts().to_vec(),
            actions_completed: self.next_action,
            actions_total: self.script.len(),
            completed_rounds: self.completed_rounds,
            failed_rounds: self.failed_rounds,
            stopped,
        }
    }

    async fn execute(&mut self, action: ScriptedAction) -> Result<(), FabricError> {
        match action {
            ScriptedAction::Send { to } => {
                self.dispatch(Event::SendRequested { to }).await;
            }
            ScriptedAction::Receive { from } => {
                let message = self.endpoint.receive(from).await?;
                self.dispatch(Event::MessageReceived(message)).await;
            }
            ScriptedAction::Wait { seconds } => {
                tokio::time::sleep(self.config.wait_duration(seconds)).await;
            }
            ScriptedAction::Snapshot => {
                self.dispatch(Event::SnapshotRequested).await;
            }
        }
        Ok(())
    }

    /// Feed one event to the state machine and perform what it returns.
    async fn dispatch(&mut self, event: Event) {
        debug!(participant = %self.id(), event = event.type_name(), "Handling event");
        let actions = self.state.handle(event);
        self.perform(actions).await;
    }

    async fn perform(&mut self, actions: Vec<Action>) {
        for action in actions {
            debug!(participant = %self.id(), action = action.type_name(), "Performing action");
            match action {
                Action::Send(message) => {
                    if let Err(e) = self.endpoint.send(message).await {
                        warn!(
                            participant = %self.id(),
                            kind = message.type_name(),
                            error = %e,
                            "Message dropped"
                        );
                    }
                }
                Action::PublishRecord { key, record } => {
                    if let Some(set) = self.board.publish(key, record) {
                        self.hand_off(set).await;
                    }
                }
                Action::FinalizeRound { key } => match self.board.finalize(key) {
                    Some(set) => self.hand_off(set).await,
                    None => {
                        debug!(participant = %self.id(), round = %key, "Round finalized, waiting for final records")
                    }
                },
            }
        }
    }

    /// Write a round's record set to the sink on the blocking pool.
    async fn hand_off(&mut self, set: SnapshotRecordSet) {
        let key = set.key;
        let records = set.len();
        if records != self.participants() {
            warn!(
                round = %key,
                records,
                participants = self.participants(),
                "Handing off round with missing records"
            );
        }
        let incomplete = set.records.iter().filter(|r| !r.complete).count();
        if incomplete > 0 {
            warn!(round = %key, incomplete, "Round includes records taken before all markers arrived");
        }

        let sink = self.sink.clone();
        let outcome = match tokio::task::spawn_blocking(move || sink.record(&set)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("sink task failed: {}", e)),
        };

        match outcome {
            Ok(()) => {
                info!(round = %key, participants = records, "Round recorded");
                self.completed_rounds.push(key);
            }
            Err(e) => {
                error!(round = %key, error = %e, "Failed to record snapshot");
                self.failed_rounds.push((key, e));
            }
        }
    }

    fn participants(&self) -> usize {
        self.state.sent_counts().len()
    }
}
