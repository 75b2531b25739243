//! Channel fabric: one FIFO queue per ordered pair of participants.

use crate::FabricError;
use cutline_types::{Message, ParticipantId};
use tokio::sync::mpsc;

/// All point-to-point channels of an `n`-participant system.
///
/// Built once per run and split into per-participant [`Endpoint`]s, each of
/// which owns its outgoing senders and incoming receivers. Every queue has
/// exactly one producer and one consumer.
pub struct ChannelFabric {
    endpoints: Vec<Endpoint>,
}

impl ChannelFabric {
    /// Wire up `participants * (participants - 1)` bounded channels.
    ///
    /// `capacity` must be at least 1.
    pub fn new(participants: usize, capacity: usize) -> Self {
        let mut endpoints: Vec<Endpoint> = ParticipantId::all(participants)
            .map(|id| Endpoint {
                id,
                outgoing: (0..participants).map(|_| None).collect(),
                incoming: (0..participants).map(|_| None).collect(),
            })
            .collect();

        for from in 0..participants {
            for to in 0..participants {
                if from == to {
                    continue;
                }
                let (tx, rx) = mpsc::channel(capacity);
                endpoints[from].outgoing[to] = Some(tx);
                endpoints[to].incoming[from] = Some(rx);
            }
        }

        Self { endpoints }
    }

    /// Hand out the endpoints, indexed by participant id.
    pub fn into_endpoints(self) -> Vec<Endpoint> {
        self.endpoints
    }
}

/// One participant's side of the fabric.
pub struct Endpoint {
    /// Owner of this endpoint.
    id: ParticipantId,

    /// Sender for the channel `id -> peer`, indexed by peer.
    outgoing: Vec<Option<mpsc::Sender<Message>>>,

    /// Receiver for the channel `peer -> id`, indexed by peer.
    incoming: Vec<Option<mpsc::Receiver<Message>>>,
}

impl Endpoint {
    /// Get the owning participant.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Enqueue `message` on the channel to `message.recipient`.
    ///
    /// Waits while the channel buffer is full.
    pub async fn send(&self, message: Message) -> Result<(), FabricError> {
        let to = message.recipient;
        let tx = self
            .outgoing
            .get(to.index())
            .and_then(Option::as_ref)
            .ok_or(FabricError::NoChannel { from: self.id, to })?;

        tx.send(message)
            .await
            .map_err(|_| FabricError::Disconnected { from: self.id, to })
    }

    /// Dequeue the next message on the channel from `from`.
    ///
    /// Waits until a message arrives. Fails only once `from` has dropped its
    /// endpoint and every buffered message has been consumed.
    pub async fn receive(&mut self, from: ParticipantId) -> Result<Message, FabricError> {
        let to = self.id;
        let rx = self
            .incoming
            .get_mut(from.index())
            .and_then(Option::as_mut)
            .ok_or(FabricError::NoChannel { from, to })?;

        rx.recv()
            .await
            .ok_or(FabricError::Disconnected { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: u32) -> ParticipantId {
        ParticipantId(id)
    }

    #[tokio::test]
    async fn test_fifo_per_pair() {
        let mut endpoints = ChannelFabric::new(2, 8).into_endpoints();
        let mut b = endpoints.pop().unwrap();
        let a = endpoints.pop().unwrap();

        a.send(Message::data(p(0), p(1), false)).await.unwrap();
        a.send(Message::data(p(0), p(1), true)).await.unwrap();

        assert!(!b.receive(p(0)).await.unwrap().taint);
        assert!(b.receive(p(0)).await.unwrap().taint);
    }

    #[tokio::test]
    async fn test_pairs_are_independent() {
        let mut endpoints = ChannelFabric::new(3, 8).into_endpoints();
        let mut c = endpoints.pop().unwrap();
        let b = endpoints.pop().unwrap();
        let a = endpoints.pop().unwrap();

        b.send(Message::data(p(1), p(2), true)).await.unwrap();
        a.send(Message::data(p(0), p(2), false)).await.unwrap();

        // Read p0's channel first even though p1 sent first
        assert_eq!(c.receive(p(0)).await.unwrap().sender, p(0));
        assert_eq!(c.receive(p(1)).await.unwrap().sender, p(1));
    }

    #[tokio::test]
    async fn test_no_self_channel() {
        let mut endpoints = ChannelFabric::new(2, 1).into_endpoints();
        let a = &mut endpoints[0];

        let err = a.send(Message::data(p(0), p(0), false)).await.unwrap_err();
        assert_eq!(err, FabricError::NoChannel { from: p(0), to: p(0) });

        let err = a.receive(p(5)).await.unwrap_err();
        assert_eq!(err, FabricError::NoChannel { from: p(5), to: p(0) });
    }

    #[tokio::test]
    async fn test_buffered_messages_survive_sender_drop() {
        let mut endpoints = ChannelFabric::new(2, 4).into_endpoints();
        let mut b = endpoints.pop().unwrap();
        let a = endpoints.pop().unwrap();

        a.send(Message::data(p(0), p(1), false)).await.unwrap();
        drop(a);

        assert!(b.receive(p(0)).await.is_ok());
        assert_eq!(
            b.receive(p(0)).await.unwrap_err(),
            FabricError::Disconnected { from: p(0), to: p(1) }
        );
    }

    #[tokio::test]
    async fn test_send_to_departed_peer() {
        let mut endpoints = ChannelFabric::new(2, 4).into_endpoints();
        drop(endpoints.pop());
        let a = endpoints.pop().unwrap();

        let err = a.send(Message::data(p(0), p(1), false)).await.unwrap_err();
        assert_eq!(err, FabricError::Disconnected { from: p(0), to: p(1) });
    }
}
