use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use serde_json::Value;

use scorecast_core::AppResult;

/// Opaque identifier of one connected client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Creates a connection identifier from the transport's own value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ConnectionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Port for the push transport that multiplexes topics over client
/// connections. Topic names are opaque strings, by convention stringified
/// resource ids or an id plus a literal suffix.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Subscribes a connection to a topic.
    async fn join_topic(&self, connection_id: &ConnectionId, topic: &str) -> AppResult<()>;

    /// Unsubscribes a connection from a topic.
    async fn leave_topic(&self, connection_id: &ConnectionId, topic: &str) -> AppResult<()>;

    /// Delivers one method call to every subscriber of a topic.
    async fn publish_to_topic(
        &self,
        topic: &str,
        method: &str,
        payload: Value,
        changed_fields: &[String],
    ) -> AppResult<()>;
}
