//! Fan-out loop driving publishes from the change bus.

use std::sync::Arc;

use scorecast_core::{AppError, AppResult};
use scorecast_domain::{CommitChangeSet, EntityChange};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::change_bus::ChangeBusReceiver;

use super::NotificationService;

impl NotificationService {
    /// Consumes the change bus until cancellation.
    ///
    /// Loss of the bus itself is fatal: once commits can no longer be
    /// enumerated the dispatcher cannot guarantee any notification
    /// correctness, so the loop stops with an error instead of idling.
    pub async fn run(
        &self,
        mut receiver: ChangeBusReceiver,
        cancel: CancellationToken,
    ) -> AppResult<()> {
        loop {
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                maybe_set = receiver.recv() => match maybe_set {
                    Some(change_set) => self.dispatch_commit(change_set, &cancel).await,
                    None => {
                        return Err(AppError::Internal(
                            "change bus closed, stopping dispatch".to_owned(),
                        ));
                    }
                },
            }
        }
    }

    /// Fans out every change of one committed change set.
    pub async fn dispatch_commit(&self, change_set: CommitChangeSet, cancel: &CancellationToken) {
        for change in &change_set.changes {
            self.dispatch_change(change, cancel).await;
        }
    }

    /// Fans one change out to every derived topic. All publishes for the
    /// event run concurrently and are awaited together; a slow or failed
    /// topic never delays or fails the others, and failures are logged
    /// without any inline retry.
    async fn dispatch_change(&self, change: &EntityChange, cancel: &CancellationToken) {
        let mut publishes = self.derive_publishes(change).await;
        publishes.extend(self.average_publishes(change).await);

        if publishes.is_empty() {
            return;
        }

        debug!(
            entity_kind = change.entity_kind(),
            method = %change.method_name(),
            topic_count = publishes.len(),
            "fanning out change"
        );

        let mut tasks = JoinSet::new();
        for publish in publishes {
            let transport = Arc::clone(&self.transport);
            tasks.spawn(async move {
                let result = transport
                    .publish_to_topic(
                        publish.topic.as_str(),
                        publish.method.as_str(),
                        publish.payload,
                        &publish.changed_fields,
                    )
                    .await;
                (publish.topic, result)
            });
        }

        loop {
            tokio::select! {
                // In-flight publishes are abandoned on cancellation, not
                // reported as success and not retried.
                () = cancel.cancelled() => {
                    tasks.abort_all();
                    return;
                }
                next = tasks.join_next() => match next {
                    None => return,
                    Some(Ok((_, Ok(())))) => {}
                    Some(Ok((topic, Err(error)))) => {
                        warn!(topic = %topic, error = %error, "publish to topic failed");
                    }
                    Some(Err(join_error)) => {
                        warn!(error = %join_error, "publish task failed");
                    }
                },
            }
        }
    }
}
