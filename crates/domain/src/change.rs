//! Typed entity-change events emitted after a storage commit.
//!
//! The union below is the closed dispatch table for change notifications:
//! adding a new entity kind means adding a variant here and a derivation arm
//! in the notification service, never runtime plugin discovery.

use scorecast_core::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;

use crate::evaluation::{Evaluation, EvaluationMove};
use crate::membership::{
    EvaluationMembership, GroupMembership, ScoringModelMembership, TeamMembership,
};
use crate::scoring::{ScoringCategory, ScoringModel, ScoringOption};
use crate::submission::Submission;
use crate::team::{Team, TeamAction, TeamDuty};

/// How an entity was mutated in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Row was inserted.
    Created,
    /// Row was updated in place.
    Updated,
    /// Row was removed.
    Deleted,
}

impl ChangeKind {
    /// Returns the suffix used in published method names.
    #[must_use]
    pub fn method_suffix(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Deleted => "Deleted",
        }
    }
}

/// One mutation of one entity.
///
/// Deletions carry the pre-deletion snapshot: the relational lookups topic
/// derivation needs are gone from the store once the row is removed, so the
/// entity must be captured before removal.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    /// Entity was inserted.
    Created(T),
    /// Entity was updated, with the camel-cased names of changed fields.
    Updated {
        /// Post-update entity state.
        entity: T,
        /// Camel-cased names of the fields that changed.
        changed_fields: Vec<String>,
    },
    /// Entity was removed; the payload is the pre-deletion snapshot.
    Deleted(T),
}

impl<T> Change<T> {
    /// Returns the mutation kind.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Created(_) => ChangeKind::Created,
            Self::Updated { .. } => ChangeKind::Updated,
            Self::Deleted(_) => ChangeKind::Deleted,
        }
    }

    /// Returns the entity state the event carries (post-change, or the
    /// pre-deletion snapshot for deletes).
    #[must_use]
    pub fn entity(&self) -> &T {
        match self {
            Self::Created(entity) | Self::Deleted(entity) => entity,
            Self::Updated { entity, .. } => entity,
        }
    }

    /// Returns the changed field names for updates, empty otherwise.
    #[must_use]
    pub fn changed_fields(&self) -> &[String] {
        match self {
            Self::Updated { changed_fields, .. } => changed_fields.as_slice(),
            _ => &[],
        }
    }
}

/// Closed tagged union over every entity kind that emits change events.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityChange {
    /// Evaluation settings changed.
    Evaluation(Change<Evaluation>),
    /// A move of an evaluation changed.
    Move(Change<EvaluationMove>),
    /// A team changed.
    Team(Change<Team>),
    /// A team action changed.
    TeamAction(Change<TeamAction>),
    /// A team duty changed.
    TeamDuty(Change<TeamDuty>),
    /// A scoring model changed.
    ScoringModel(Change<ScoringModel>),
    /// A category within a scoring model changed.
    ScoringCategory(Change<ScoringCategory>),
    /// An option within a scoring category changed.
    ScoringOption(Change<ScoringOption>),
    /// A score submission changed.
    Submission(Change<Submission>),
    /// An evaluation membership grant changed.
    EvaluationMembership(Change<EvaluationMembership>),
    /// A scoring model membership grant changed.
    ScoringModelMembership(Change<ScoringModelMembership>),
    /// A team membership grant changed.
    TeamMembership(Change<TeamMembership>),
    /// A group membership changed.
    GroupMembership(Change<GroupMembership>),
}

impl EntityChange {
    /// Returns the published name of the entity kind.
    #[must_use]
    pub fn entity_kind(&self) -> &'static str {
        match self {
            Self::Evaluation(_) => "Evaluation",
            Self::Move(_) => "Move",
            Self::Team(_) => "Team",
            Self::TeamAction(_) => "TeamAction",
            Self::TeamDuty(_) => "TeamDuty",
            Self::ScoringModel(_) => "ScoringModel",
            Self::ScoringCategory(_) => "ScoringCategory",
            Self::ScoringOption(_) => "ScoringOption",
            Self::Submission(_) => "Submission",
            Self::EvaluationMembership(_) => "EvaluationMembership",
            Self::ScoringModelMembership(_) => "ScoringModelMembership",
            Self::TeamMembership(_) => "TeamMembership",
            Self::GroupMembership(_) => "GroupMembership",
        }
    }

    /// Returns the mutation kind.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Evaluation(change) => change.kind(),
            Self::Move(change) => change.kind(),
            Self::Team(change) => change.kind(),
            Self::TeamAction(change) => change.kind(),
            Self::TeamDuty(change) => change.kind(),
            Self::ScoringModel(change) => change.kind(),
            Self::ScoringCategory(change) => change.kind(),
            Self::ScoringOption(change) => change.kind(),
            Self::Submission(change) => change.kind(),
            Self::EvaluationMembership(change) => change.kind(),
            Self::ScoringModelMembership(change) => change.kind(),
            Self::TeamMembership(change) => change.kind(),
            Self::GroupMembership(change) => change.kind(),
        }
    }

    /// Returns the versioned published method name, e.g. `SubmissionUpdated`.
    #[must_use]
    pub fn method_name(&self) -> String {
        format!("{}{}", self.entity_kind(), self.kind().method_suffix())
    }

    /// Returns the changed field names for updates, empty otherwise.
    #[must_use]
    pub fn changed_fields(&self) -> &[String] {
        match self {
            Self::Evaluation(change) => change.changed_fields(),
            Self::Move(change) => change.changed_fields(),
            Self::Team(change) => change.changed_fields(),
            Self::TeamAction(change) => change.changed_fields(),
            Self::TeamDuty(change) => change.changed_fields(),
            Self::ScoringModel(change) => change.changed_fields(),
            Self::ScoringCategory(change) => change.changed_fields(),
            Self::ScoringOption(change) => change.changed_fields(),
            Self::Submission(change) => change.changed_fields(),
            Self::EvaluationMembership(change) => change.changed_fields(),
            Self::ScoringModelMembership(change) => change.changed_fields(),
            Self::TeamMembership(change) => change.changed_fields(),
            Self::GroupMembership(change) => change.changed_fields(),
        }
    }

    /// Serializes the carried entity into its published camel-cased view.
    pub fn payload(&self) -> AppResult<Value> {
        fn to_value<T: Serialize>(entity: &T) -> AppResult<Value> {
            serde_json::to_value(entity).map_err(|error| {
                AppError::Internal(format!("failed to serialize change payload: {error}"))
            })
        }

        match self {
            Self::Evaluation(change) => to_value(change.entity()),
            Self::Move(change) => to_value(change.entity()),
            Self::Team(change) => to_value(change.entity()),
            Self::TeamAction(change) => to_value(change.entity()),
            Self::TeamDuty(change) => to_value(change.entity()),
            Self::ScoringModel(change) => to_value(change.entity()),
            Self::ScoringCategory(change) => to_value(change.entity()),
            Self::ScoringOption(change) => to_value(change.entity()),
            Self::Submission(change) => to_value(change.entity()),
            Self::EvaluationMembership(change) => to_value(change.entity()),
            Self::ScoringModelMembership(change) => to_value(change.entity()),
            Self::TeamMembership(change) => to_value(change.entity()),
            Self::GroupMembership(change) => to_value(change.entity()),
        }
    }
}

/// All entity changes produced by one durable storage commit.
///
/// Ordering across different entities in one commit is unspecified; ordering
/// of changes for the same entity across successive commits follows commit
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitChangeSet {
    /// Changes in the order the store reported them.
    pub changes: Vec<EntityChange>,
}

impl CommitChangeSet {
    /// Creates a change set from one change.
    #[must_use]
    pub fn single(change: EntityChange) -> Self {
        Self {
            changes: vec![change],
        }
    }

    /// Returns whether the commit touched no notified entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use scorecast_core::{EvaluationId, ScoringModelId};

    use crate::evaluation::Evaluation;

    use super::{Change, EntityChange};

    #[test]
    fn method_names_follow_the_fixed_catalog() {
        let evaluation = Evaluation {
            id: EvaluationId::new(),
            name: "Autumn Exercise".to_owned(),
            scoring_model_id: ScoringModelId::new(),
            current_move_number: 1,
        };

        let created = EntityChange::Evaluation(Change::Created(evaluation.clone()));
        assert_eq!(created.method_name(), "EvaluationCreated");

        let updated = EntityChange::Evaluation(Change::Updated {
            entity: evaluation.clone(),
            changed_fields: vec!["name".to_owned()],
        });
        assert_eq!(updated.method_name(), "EvaluationUpdated");
        assert_eq!(updated.changed_fields(), ["name".to_owned()]);

        let deleted = EntityChange::Evaluation(Change::Deleted(evaluation));
        assert_eq!(deleted.method_name(), "EvaluationDeleted");
    }

    #[test]
    fn payload_is_camel_cased() {
        let evaluation = Evaluation {
            id: EvaluationId::new(),
            name: "Autumn Exercise".to_owned(),
            scoring_model_id: ScoringModelId::new(),
            current_move_number: 4,
        };
        let change = EntityChange::Evaluation(Change::Created(evaluation));
        let payload = change.payload();
        assert!(payload.is_ok());
        let payload = payload.unwrap_or_default();
        assert!(payload.get("currentMoveNumber").is_some());
        assert!(payload.get("current_move_number").is_none());
    }
}
