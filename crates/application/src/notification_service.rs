use std::sync::Arc;

use serde_json::Value;

use crate::push_ports::PushTransport;
use crate::store_ports::RelationLookupRepository;

mod averages;
mod derive;
mod dispatch;

#[cfg(test)]
mod tests;

/// One publish call the dispatcher will issue for one change event.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicPublish {
    /// Destination topic.
    pub topic: String,
    /// Published method name from the fixed per-kind catalog.
    pub method: String,
    /// Camel-cased entity view carried to subscribers.
    pub payload: Value,
    /// Camel-cased changed field names, empty except for updates.
    pub changed_fields: Vec<String>,
}

/// Application service fanning entity changes out to push topics.
///
/// Topic derivation and average projection are pure over the change plus
/// explicit relational lookups; all store reads go through the post-commit
/// durable view so the derived recipient set reflects the current graph.
#[derive(Clone)]
pub struct NotificationService {
    lookups: Arc<dyn RelationLookupRepository>,
    transport: Arc<dyn PushTransport>,
}

impl NotificationService {
    /// Creates a notification service from lookup and transport ports.
    #[must_use]
    pub fn new(
        lookups: Arc<dyn RelationLookupRepository>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        Self { lookups, transport }
    }
}
