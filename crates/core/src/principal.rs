use serde::{Deserialize, Serialize};

use crate::UserId;

/// Authenticated identity attached to a request or connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: UserId,
    display_name: String,
}

impl Principal {
    /// Creates a principal from authentication data.
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }

    /// Returns the stable user identifier behind this principal.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}
