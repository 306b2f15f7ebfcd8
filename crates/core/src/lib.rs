//! Shared primitives for all Rust crates in Scorecast.

#![forbid(unsafe_code)]

/// Principal identity shared across services.
pub mod principal;

mod ids;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ids::{
    EvaluationId, GroupId, MoveId, RoleId, ScoringCategoryId, ScoringModelId, ScoringOptionId,
    SubmissionId, TeamActionId, TeamDutyId, TeamId, TeamTypeId, UserId,
};
pub use principal::Principal;

/// Result type used across Scorecast crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{NonEmptyString, UserId};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn user_id_formats_as_uuid() {
        let user_id = UserId::new();
        assert_eq!(user_id.to_string().len(), 36);
    }
}
