//! In-process bus carrying commit change sets to the fan-out dispatcher.
//!
//! A single consumer drains the channel in commit order, which preserves
//! per-entity event ordering across successive commits. Delivery happens
//! strictly after the commit is durable: publishers hand over the change set
//! only once the storage transaction has committed.

use scorecast_core::{AppError, AppResult};
use scorecast_domain::CommitChangeSet;
use tokio::sync::mpsc;

/// Sending half of the change bus, held by every mutation path.
#[derive(Clone)]
pub struct ChangeBus {
    sender: mpsc::UnboundedSender<CommitChangeSet>,
}

/// Receiving half of the change bus, owned by the dispatcher loop.
pub type ChangeBusReceiver = mpsc::UnboundedReceiver<CommitChangeSet>;

impl ChangeBus {
    /// Creates a connected bus and its single consumer endpoint.
    #[must_use]
    pub fn channel() -> (Self, ChangeBusReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Hands one committed change set to the dispatcher.
    ///
    /// A closed bus is fatal: notification correctness can no longer be
    /// guaranteed once commits stop reaching the dispatcher, so the error
    /// must propagate instead of being swallowed.
    pub fn publish(&self, change_set: CommitChangeSet) -> AppResult<()> {
        if change_set.is_empty() {
            return Ok(());
        }

        self.sender
            .send(change_set)
            .map_err(|_| AppError::Internal("change bus is closed".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use scorecast_core::EvaluationId;
    use scorecast_domain::{Change, CommitChangeSet, EntityChange, Evaluation};

    use super::ChangeBus;

    fn evaluation_change() -> EntityChange {
        EntityChange::Evaluation(Change::Created(Evaluation {
            id: EvaluationId::new(),
            name: "Exercise".to_owned(),
            scoring_model_id: scorecast_core::ScoringModelId::new(),
            current_move_number: 1,
        }))
    }

    #[tokio::test]
    async fn publish_preserves_commit_order() {
        let (bus, mut receiver) = ChangeBus::channel();
        let first = CommitChangeSet::single(evaluation_change());
        let second = CommitChangeSet::single(evaluation_change());

        assert!(bus.publish(first.clone()).is_ok());
        assert!(bus.publish(second.clone()).is_ok());

        assert_eq!(receiver.recv().await, Some(first));
        assert_eq!(receiver.recv().await, Some(second));
    }

    #[tokio::test]
    async fn empty_change_sets_are_not_delivered() {
        let (bus, mut receiver) = ChangeBus::channel();
        assert!(bus.publish(CommitChangeSet::default()).is_ok());
        drop(bus);
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn closed_bus_is_a_fatal_error() {
        let (bus, receiver) = ChangeBus::channel();
        drop(receiver);
        assert!(bus.publish(CommitChangeSet::single(evaluation_change())).is_err());
    }
}
