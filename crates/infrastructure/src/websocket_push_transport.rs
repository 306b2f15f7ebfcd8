use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use scorecast_application::{ConnectionId, PushTransport};
use scorecast_core::AppResult;

/// One push frame as written to a client socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushFrame {
    /// Method name of the form `<Kind><Created|Updated|Deleted>`.
    pub method: String,
    /// Entity payload or projection.
    pub payload: Value,
    /// Camel-cased changed field names, empty except on updates.
    pub changed_fields: Vec<String>,
}

/// Receiving half of one registered connection's frame queue.
pub type PushFrameReceiver = mpsc::UnboundedReceiver<PushFrame>;

/// In-process topic registry multiplexing pushes over websocket connections.
///
/// The websocket handler owns the socket itself; this registry only maps
/// topics to connections and queues frames per connection, so publishing
/// never blocks on a slow socket.
#[derive(Debug, Default)]
pub struct WebSocketPushTransport {
    subscriptions: RwLock<HashMap<String, HashSet<ConnectionId>>>,
    senders: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<PushFrame>>>,
}

impl WebSocketPushTransport {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns the queue its socket task drains.
    pub async fn register_connection(&self, connection_id: ConnectionId) -> PushFrameReceiver {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.senders.write().await.insert(connection_id, sender);
        receiver
    }

    /// Drops a connection and every subscription it held.
    pub async fn unregister_connection(&self, connection_id: &ConnectionId) {
        self.senders.write().await.remove(connection_id);
        let mut subscriptions = self.subscriptions.write().await;
        for members in subscriptions.values_mut() {
            members.remove(connection_id);
        }
        subscriptions.retain(|_, members| !members.is_empty());
    }
}

#[async_trait]
impl PushTransport for WebSocketPushTransport {
    async fn join_topic(&self, connection_id: &ConnectionId, topic: &str) -> AppResult<()> {
        self.subscriptions
            .write()
            .await
            .entry(topic.to_owned())
            .or_default()
            .insert(connection_id.clone());
        debug!(connection_id = %connection_id, topic = %topic, "topic joined");
        Ok(())
    }

    async fn leave_topic(&self, connection_id: &ConnectionId, topic: &str) -> AppResult<()> {
        let mut subscriptions = self.subscriptions.write().await;
        if let Some(members) = subscriptions.get_mut(topic) {
            members.remove(connection_id);
            if members.is_empty() {
                subscriptions.remove(topic);
            }
        }
        Ok(())
    }

    async fn publish_to_topic(
        &self,
        topic: &str,
        method: &str,
        payload: Value,
        changed_fields: &[String],
    ) -> AppResult<()> {
        let members: Vec<ConnectionId> = {
            let subscriptions = self.subscriptions.read().await;
            match subscriptions.get(topic) {
                Some(members) => members.iter().cloned().collect(),
                None => return Ok(()),
            }
        };

        let frame = PushFrame {
            method: method.to_owned(),
            payload,
            changed_fields: changed_fields.to_vec(),
        };

        let mut stale = Vec::new();
        {
            let senders = self.senders.read().await;
            for connection_id in members {
                match senders.get(&connection_id) {
                    Some(sender) if sender.send(frame.clone()).is_ok() => {}
                    // Queue gone: the socket task ended without unregistering.
                    _ => stale.push(connection_id),
                }
            }
        }

        for connection_id in stale {
            warn!(connection_id = %connection_id, "pruning stale connection");
            self.unregister_connection(&connection_id).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use scorecast_application::{ConnectionId, PushTransport};

    use super::WebSocketPushTransport;

    #[tokio::test]
    async fn publish_reaches_only_subscribed_connections() {
        let transport = WebSocketPushTransport::new();
        let subscriber = ConnectionId::new("subscriber");
        let bystander = ConnectionId::new("bystander");

        let mut subscriber_frames = transport.register_connection(subscriber.clone()).await;
        let mut bystander_frames = transport.register_connection(bystander.clone()).await;
        assert!(transport.join_topic(&subscriber, "topic-a").await.is_ok());

        let result = transport
            .publish_to_topic("topic-a", "TeamUpdated", json!({"name": "Blue"}), &[])
            .await;
        assert!(result.is_ok());

        let Some(frame) = subscriber_frames.recv().await else {
            panic!("expected a frame");
        };
        assert_eq!(frame.method, "TeamUpdated");
        assert!(bystander_frames.try_recv().is_err());
    }

    #[tokio::test]
    async fn leaving_a_topic_stops_delivery() {
        let transport = WebSocketPushTransport::new();
        let connection = ConnectionId::new("conn");
        let mut frames = transport.register_connection(connection.clone()).await;

        assert!(transport.join_topic(&connection, "topic-a").await.is_ok());
        assert!(transport.leave_topic(&connection, "topic-a").await.is_ok());

        let result = transport
            .publish_to_topic("topic-a", "TeamUpdated", json!({}), &[])
            .await;
        assert!(result.is_ok());
        assert!(frames.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_connections_are_pruned_on_publish() {
        let transport = WebSocketPushTransport::new();
        let connection = ConnectionId::new("conn");
        let frames = transport.register_connection(connection.clone()).await;
        assert!(transport.join_topic(&connection, "topic-a").await.is_ok());
        drop(frames);

        let result = transport
            .publish_to_topic("topic-a", "TeamUpdated", json!({}), &[])
            .await;
        assert!(result.is_ok());

        let again = transport
            .publish_to_topic("topic-a", "TeamUpdated", json!({}), &[])
            .await;
        assert!(again.is_ok());
    }
}
