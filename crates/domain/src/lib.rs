//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod change;
mod evaluation;
mod membership;
mod permission;
mod role;
mod scoring;
mod submission;
mod team;
mod user;

pub use change::{Change, ChangeKind, CommitChangeSet, EntityChange};
pub use evaluation::{Evaluation, EvaluationMove};
pub use membership::{
    EvaluationMembership, Group, GroupMembership, PrincipalRef, ScoringModelMembership,
    TeamMembership,
};
pub use permission::{
    AccessRequest, EvaluationPermission, Permission, PermissionSet, ResourceKind,
    ScoringModelPermission, SystemPermission, TeamPermission,
};
pub use role::{Role, RoleCatalog};
pub use scoring::{
    ScoringCategory, ScoringCategoryTree, ScoringModel, ScoringModelTree, ScoringOption,
};
pub use submission::{
    AverageScope, AverageSubmission, Submission, SubmissionScope, SubmissionSelection,
};
pub use team::{Team, TeamAction, TeamDuty, TeamType};
pub use user::User;
