// Replication bridges plus the serializer tasks that move updates on and off the wire.

use crate::domain::{ReplicationBridge, ReplicationUpdate};
use crate::interface_adapters::protocol::{ReplicationMessage, decode_update};
use crate::use_cases::SessionEvent;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, warn};

/// Outbox bridge for single-process scenes. Updates wait until drained.
#[derive(Debug, Default)]
pub struct LocalBridge {
    outbox: Vec<ReplicationUpdate>,
}

impl LocalBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<ReplicationUpdate> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending(&self) -> &[ReplicationUpdate] {
        &self.outbox
    }
}

impl ReplicationBridge for LocalBridge {
    fn broadcast(&mut self, update: ReplicationUpdate) {
        self.outbox.push(update);
    }
}

/// Publishes updates on a broadcast channel for the serializer task.
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    tx: broadcast::Sender<ReplicationUpdate>,
}

impl ChannelBridge {
    pub fn new(tx: broadcast::Sender<ReplicationUpdate>) -> Self {
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReplicationUpdate> {
        self.tx.subscribe()
    }
}

impl ReplicationBridge for ChannelBridge {
    fn broadcast(&mut self, update: ReplicationUpdate) {
        // Nobody listening yet means nobody to tell.
        let _ = self.tx.send(update);
    }
}

pub async fn replication_serializer(
    mut update_rx: broadcast::Receiver<ReplicationUpdate>,
    text_tx: broadcast::Sender<String>,
) {
    // Serialize each update once and fan the text out to every transport.
    loop {
        match update_rx.recv().await {
            Ok(update) => {
                let msg = ReplicationMessage::from(update);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize replication update");
                        continue;
                    }
                };
                let _ = text_tx.send(txt);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "replication serializer lagged; late joiner sync will repair peers"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("replication channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn replication_deserializer(
    mut text_rx: mpsc::Receiver<String>,
    event_tx: mpsc::Sender<SessionEvent>,
) {
    while let Some(text) = text_rx.recv().await {
        let update = match decode_update(&text) {
            Ok(update) => update,
            Err(e) => {
                warn!(error = %e, "dropping inbound replication message");
                continue;
            }
        };
        if event_tx.send(SessionEvent::Remote(update)).await.is_err() {
            debug!("session closed; deserializer exiting");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArenaId, EntityId, ParticipantId, ReplicatedField};

    fn owner_update() -> ReplicationUpdate {
        ReplicationUpdate::entity(
            EntityId::from_parts(1, 0),
            ReplicatedField::Owner(Some(ParticipantId(7))),
        )
    }

    #[tokio::test]
    async fn when_update_is_published_then_serializer_emits_json() {
        let (update_tx, update_rx) = broadcast::channel(8);
        let (text_tx, mut text_rx) = broadcast::channel(8);
        let task = tokio::spawn(replication_serializer(update_rx, text_tx));

        let mut bridge = ChannelBridge::new(update_tx);
        bridge.broadcast(owner_update());

        let text = text_rx.recv().await.expect("serialized text");
        assert_eq!(decode_update(&text).expect("decodes"), owner_update());

        drop(bridge);
        task.await.expect("serializer exits when channel closes");
    }

    #[tokio::test]
    async fn when_inbound_text_is_malformed_then_deserializer_skips_it() {
        let (text_tx, text_rx) = mpsc::channel(8);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let task = tokio::spawn(replication_deserializer(text_rx, event_tx));

        let good = serde_json::to_string(&ReplicationMessage::from(owner_update())).expect("json");
        text_tx.send("{".to_string()).await.expect("send");
        text_tx.send(good).await.expect("send");
        drop(text_tx);

        let event = event_rx.recv().await.expect("one event");
        assert!(matches!(event, SessionEvent::Remote(update) if update == owner_update()));
        task.await.expect("deserializer exits");
        assert!(event_rx.recv().await.is_none());
    }

    #[test]
    fn when_local_bridge_is_drained_then_outbox_empties() {
        let mut bridge = LocalBridge::new();
        bridge.broadcast(owner_update());

        assert_eq!(bridge.pending().len(), 1);
        assert_eq!(bridge.drain(), vec![owner_update()]);
        assert!(bridge.pending().is_empty());
    }
}
