//! Typed identifiers for every persisted resource.
//!
//! Each identifier wraps a UUID so that a team id can never be passed where
//! an evaluation id is expected. Push-notification topic names are the
//! `Display` form of these ids, optionally followed by a literal suffix.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! resource_id {
    ($(#[$docs:meta])* $name:ident) => {
        $(#[$docs])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub const fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

resource_id!(
    /// Identifier of an authenticated user.
    UserId
);
resource_id!(
    /// Identifier of a user group used for indirect role grants.
    GroupId
);
resource_id!(
    /// Identifier of a seeded role definition.
    RoleId
);
resource_id!(
    /// Identifier of an evaluation exercise.
    EvaluationId
);
resource_id!(
    /// Identifier of a move within an evaluation.
    MoveId
);
resource_id!(
    /// Identifier of a scoring model.
    ScoringModelId
);
resource_id!(
    /// Identifier of a category within a scoring model.
    ScoringCategoryId
);
resource_id!(
    /// Identifier of a selectable option within a scoring category.
    ScoringOptionId
);
resource_id!(
    /// Identifier of a team participating in an evaluation.
    TeamId
);
resource_id!(
    /// Identifier of a team type grouping similar teams.
    TeamTypeId
);
resource_id!(
    /// Identifier of an action tracked by a team.
    TeamActionId
);
resource_id!(
    /// Identifier of a duty assigned within a team.
    TeamDutyId
);
resource_id!(
    /// Identifier of a score submission.
    SubmissionId
);
