//! End-to-end snapshot rounds over the concurrent runner.

use cutline_simulation::{SimulationConfig, SimulationError, SimulationReport, SimulationRunner};
use cutline_sink::{MemorySnapshotSink, SinkError, SnapshotSink};
use cutline_test_helpers::{p, TraceBuilder};
use cutline_trace::Trace;
use cutline_types::{
    RoundId, RoundKey, SnapshotRecordSet, TaintWitness, WitnessEvidence,
};
use std::sync::Arc;
use std::time::Duration;

async fn run(trace: Trace) -> (SimulationReport, Arc<MemorySnapshotSink>) {
    let sink = Arc::new(MemorySnapshotSink::new());
    let report = SimulationRunner::new(SimulationConfig::default(), trace, sink.clone())
        .run()
        .await
        .unwrap();
    (report, sink)
}

fn round(initiator: u32, id: u64) -> RoundKey {
    RoundKey::new(p(initiator), RoundId(id))
}

/// Every record is final, and for every ordered pair the sender's recorded
/// sends equal the receiver's recorded receives plus its channel state.
fn assert_consistent_cut(set: &SnapshotRecordSet, participants: u32) {
    assert_eq!(set.len(), participants as usize, "round {}", set.key);
    for record in &set.records {
        assert!(record.complete, "round {}: {} not final", set.key, record.participant);
    }
    for sender in 0..participants {
        for receiver in (0..participants).filter(|&r| r != sender) {
            let sent = set.record(p(sender)).unwrap().recorded_sent[receiver as usize];
            let at = set.record(p(receiver)).unwrap();
            assert_eq!(
                sent,
                at.recorded_received[sender as usize] + at.channel_in_flight[sender as usize],
                "round {}: channel p{} -> p{}",
                set.key,
                sender,
                receiver
            );
        }
    }
}

/// p0 sends to p1, p1 sends to p2, then p0 snapshots and the markers
/// propagate through every channel.
fn chain_trace() -> Trace {
    TraceBuilder::new(3)
        .tainted(0)
        .send(0, 1)
        .receive(1, 0)
        .send(1, 2)
        .receive(2, 1)
        .snapshot(0)
        .receive(1, 0)
        .receive(2, 0)
        .receive(0, 1)
        .receive(0, 2)
        .receive(1, 2)
        .receive(2, 1)
        .build()
}

#[tokio::test]
async fn test_end_to_end_chain() {
    let (report, sink) = run(chain_trace()).await;

    assert_eq!(report.completed_rounds, vec![round(0, 0)]);
    assert!(report.failed_rounds.is_empty());
    assert!(report.unfinished_rounds.is_empty());
    assert_eq!(report.stopped().count(), 0);

    let sets = sink.sets();
    assert_eq!(sets.len(), 1);
    let set = &sets[0];
    assert_eq!(set.key, round(0, 0));
    assert_eq!(set.len(), 3);

    let p0 = set.record(p(0)).unwrap();
    assert_eq!(p0.recorded_sent, vec![0, 1, 0]);
    assert!(p0.recorded_taint);

    let p1 = set.record(p(1)).unwrap();
    assert_eq!(p1.recorded_received, vec![1, 0, 0]);
    assert_eq!(p1.recorded_sent, vec![0, 0, 1]);
    assert!(p1.recorded_taint);

    let p2 = set.record(p(2)).unwrap();
    assert_eq!(p2.recorded_received, vec![0, 1, 0]);
    assert_eq!(p2.channel_in_flight, vec![0, 0, 0]);
    assert!(p2.recorded_taint);

    for record in &set.records {
        assert_eq!(record.in_flight_total(), 0);
        assert_eq!(record.taint_witness, None);
    }
    assert_consistent_cut(set, 3);
}

#[tokio::test]
async fn test_channel_state_matches_sends_across_cut() {
    // p1 and p2 each send one message to p0 before anyone records. p0
    // snapshots first, so both messages are in flight across the cut.
    let trace = TraceBuilder::new(3)
        .tainted(1)
        .send(1, 0)
        .send(2, 0)
        .snapshot(0)
        .receive(0, 1)
        .receive(0, 2)
        .receive(1, 0)
        .receive(2, 0)
        .receive(1, 2)
        .receive(2, 1)
        .receive(0, 1)
        .receive(0, 2)
        .build();

    let (report, sink) = run(trace).await;
    assert_eq!(report.completed_rounds, vec![round(0, 0)]);

    let set = sink.get(round(0, 0)).unwrap();
    let p0 = set.record(p(0)).unwrap();
    assert_eq!(p0.recorded_received, vec![0, 0, 0]);
    assert_eq!(p0.channel_in_flight, vec![0, 1, 1]);
    assert!(!p0.recorded_taint);
    assert_eq!(
        p0.taint_witness,
        Some(TaintWitness {
            peer: p(1),
            evidence: WitnessEvidence::Message,
        })
    );

    // Every message the senders recorded as sent is either recorded as
    // received at p0 or counted in p0's channel state.
    for sender in [p(1), p(2)] {
        let sent = set.record(sender).unwrap().recorded_sent[0];
        assert_eq!(
            sent,
            p0.recorded_received[sender.index()] + p0.channel_in_flight[sender.index()],
            "channel {} -> p0",
            sender
        );
    }

    assert_consistent_cut(&set, 3);

    // After the run p0 is tainted even though its recorded state is not
    assert!(report.participant(p(0)).unwrap().taint);
}

#[tokio::test(start_paused = true)]
async fn test_channel_state_final_at_non_initiator() {
    // p2's data message to p1 crosses the cut. p1 records on p0's marker,
    // then sits in a WAIT while p0 collects both acknowledgments and
    // finalizes. The round must still carry the message in p1's channel
    // state once p1 consumes it.
    let trace = TraceBuilder::new(3)
        .tainted(0)
        .send(2, 1)
        .snapshot(0)
        .receive(1, 0)
        .wait(1, 5)
        .receive(1, 2)
        .receive(1, 2)
        .receive(2, 0)
        .receive(2, 1)
        .receive(0, 1)
        .receive(0, 2)
        .build();

    let (report, sink) = run(trace).await;
    assert_eq!(report.completed_rounds, vec![round(0, 0)]);

    let set = sink.get(round(0, 0)).unwrap();
    let p1 = set.record(p(1)).unwrap();
    assert_eq!(p1.recorded_received, vec![0, 0, 0]);
    assert_eq!(p1.channel_in_flight, vec![0, 0, 1]);
    assert_eq!(set.record(p(2)).unwrap().recorded_sent, vec![0, 1, 0]);
    assert_consistent_cut(&set, 3);
}

#[tokio::test]
async fn test_participant_ending_early_leaves_record_not_final() {
    // p1 records on p0's marker and its script ends before p2's marker
    // reaches it. The round is handed off once p1 is gone, with p1's
    // record flagged.
    let trace = TraceBuilder::new(3)
        .snapshot(0)
        .receive(1, 0)
        .receive(2, 0)
        .receive(2, 1)
        .receive(0, 1)
        .receive(0, 2)
        .build();

    let (report, sink) = run(trace).await;

    assert_eq!(report.completed_rounds, vec![round(0, 0)]);
    assert!(report.unfinished_rounds.is_empty());
    let set = sink.get(round(0, 0)).unwrap();
    assert_eq!(set.len(), 3);
    assert!(set.record(p(0)).unwrap().complete);
    assert!(!set.record(p(1)).unwrap().complete);
    assert!(set.record(p(2)).unwrap().complete);
}

#[tokio::test]
async fn test_no_finalize_with_n_minus_two_markers() {
    let trace = TraceBuilder::new(4)
        .snapshot(0)
        .receive(1, 0)
        .receive(2, 0)
        .receive(0, 1)
        .receive(0, 2)
        .build();

    let (report, sink) = run(trace).await;

    assert!(sink.is_empty());
    assert!(report.completed_rounds.is_empty());
    assert_eq!(report.unfinished_rounds, vec![round(0, 0)]);
}

#[tokio::test]
async fn test_finalize_exactly_once_with_n_minus_one_markers() {
    let trace = TraceBuilder::new(4)
        .snapshot(0)
        .receive(1, 0)
        .receive(2, 0)
        .receive(3, 0)
        .receive_all(0, &[1, 2, 3])
        // Forwarded markers between non-initiators arrive after the fact
        .receive_all(1, &[2, 3])
        .receive_all(2, &[1, 3])
        .receive_all(3, &[1, 2])
        .build();

    let (report, sink) = run(trace).await;

    assert_eq!(sink.len(), 1);
    assert_eq!(report.completed_rounds, vec![round(0, 0)]);
    assert!(report.unfinished_rounds.is_empty());
    assert_eq!(sink.sets()[0].len(), 4);
}

#[tokio::test]
async fn test_concurrent_initiators_same_round_id() {
    // p0 and p1 both open their round 0; the rounds must stay separate.
    let trace = TraceBuilder::new(3)
        .tainted(0)
        .send(0, 2)
        .receive(2, 0) // data
        .snapshot(0)
        .snapshot(1)
        .receive(0, 1) // B first
        .receive(0, 1) // A from p1
        .receive(0, 2) // A from p2 -> completes A
        .receive(0, 2) // B from p2
        .receive(1, 0) // A first
        .receive(1, 0) // B from p0
        .receive(1, 2) // A from p2
        .receive(1, 2) // B from p2 -> completes B
        .receive(2, 0) // A first
        .receive(2, 1) // B first
        .receive(2, 0) // B from p0
        .receive(2, 1) // A from p1
        .build();

    let (report, sink) = run(trace).await;

    let a = round(0, 0);
    let b = round(1, 0);
    assert_eq!(report.completed_rounds, vec![a, b]);
    assert_eq!(sink.len(), 2);

    let set_a = sink.get(a).unwrap();
    let set_b = sink.get(b).unwrap();
    assert_consistent_cut(&set_a, 3);
    assert_consistent_cut(&set_b, 3);

    // p0 recorded A at its own SNAPSHOT and B on p1's marker, both after
    // its single send.
    assert_eq!(set_a.record(p(0)).unwrap().recorded_sent, vec![0, 0, 1]);
    assert_eq!(set_b.record(p(0)).unwrap().recorded_sent, vec![0, 0, 1]);
    assert_eq!(set_a.record(p(2)).unwrap().recorded_received, vec![1, 0, 0]);
    assert_eq!(set_b.record(p(2)).unwrap().recorded_received, vec![1, 0, 0]);

    // p1's marker for B reported p0 tainted at p0's cut
    assert_eq!(
        set_b.record(p(1)).unwrap().taint_witness,
        Some(TaintWitness {
            peer: p(0),
            evidence: WitnessEvidence::Marker,
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_runs_identical() {
    let mut previous: Option<Vec<SnapshotRecordSet>> = None;
    for _ in 0..5 {
        let (_, sink) = run(chain_trace()).await;
        let sets = sink.sets();
        if let Some(previous) = &previous {
            assert_eq!(&sets, previous);
        }
        previous = Some(sets);
    }
}

#[tokio::test]
async fn test_taint_propagates_along_data_only() {
    let trace = TraceBuilder::new(4)
        .tainted(0)
        .send(0, 1)
        .receive(1, 0)
        .send(1, 2)
        .receive(2, 1)
        // p3 only ever hears p0's markers
        .snapshot(0)
        .receive(3, 0)
        .build();

    let (report, _) = run(trace).await;

    assert!(report.participant(p(0)).unwrap().taint);
    assert!(report.participant(p(1)).unwrap().taint);
    assert!(report.participant(p(2)).unwrap().taint);
    // A marker from a tainted sender does not taint
    assert!(!report.participant(p(3)).unwrap().taint);
}

#[tokio::test(start_paused = true)]
async fn test_wait_suspends_only_the_waiter() {
    let trace = TraceBuilder::new(3)
        .wait(0, 5)
        .send(0, 1)
        .receive(1, 0)
        .send(2, 1)
        .receive(1, 2)
        .build();

    let start = tokio::time::Instant::now();
    let (report, _) = run(trace).await;

    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(report.participant(p(1)).unwrap().received, vec![1, 0, 1]);
}

#[tokio::test]
async fn test_receive_from_finished_peer_stops_only_that_participant() {
    let trace = TraceBuilder::new(3)
        .send(2, 0)
        .receive(1, 0)
        .receive(0, 2)
        .build();

    let (report, _) = run(trace).await;

    let stopped: Vec<_> = report.stopped().map(|r| r.participant).collect();
    assert_eq!(stopped, vec![p(1)]);

    let p1 = report.participant(p(1)).unwrap();
    assert_eq!(p1.actions_completed, 0);
    assert_eq!(p1.actions_total, 1);

    let p0 = report.participant(p(0)).unwrap();
    assert!(p0.stopped.is_none());
    assert_eq!(p0.received, vec![0, 0, 1]);
}

struct FailingSink;

impl SnapshotSink for FailingSink {
    fn record(&self, _set: &SnapshotRecordSet) -> Result<(), SinkError> {
        Err(SinkError::Io {
            path: "unwritable".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
}

#[tokio::test]
async fn test_sink_failure_reported_not_retried() {
    let trace = TraceBuilder::new(1).snapshot(0).snapshot(0).build();

    let report = SimulationRunner::new(SimulationConfig::default(), trace, Arc::new(FailingSink))
        .run()
        .await
        .unwrap();

    assert!(report.completed_rounds.is_empty());
    let failed: Vec<_> = report.failed_rounds.iter().map(|(key, _)| *key).collect();
    assert_eq!(failed, vec![round(0, 0), round(0, 1)]);
    assert!(report.failed_rounds[0].1.contains("denied"));
    assert!(report.unfinished_rounds.is_empty());
}

#[tokio::test]
async fn test_zero_capacity_rejected() {
    let trace = TraceBuilder::new(2).build();
    let result = SimulationRunner::new(
        SimulationConfig::default().with_channel_capacity(0),
        trace,
        Arc::new(MemorySnapshotSink::new()),
    )
    .run()
    .await;

    assert!(matches!(result, Err(SimulationError::Config(_))));
}
