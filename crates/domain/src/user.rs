//! User accounts.

use scorecast_core::{RoleId, UserId};
use serde::{Deserialize, Serialize};

/// An authenticated account. Created on first authenticated contact and never
/// hard-deleted while referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable user identifier.
    pub id: UserId,
    /// Display name.
    pub display_name: String,
    /// Optional single system role. System access uses this field directly;
    /// there is no system membership table.
    pub system_role_id: Option<RoleId>,
}

impl User {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.display_name != previous.display_name {
            changed.push("displayName".to_owned());
        }
        if self.system_role_id != previous.system_role_id {
            changed.push("systemRoleId".to_owned());
        }
        changed
    }
}
