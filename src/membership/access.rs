//! Permission checks over a member's role.
//!
//! These checks decide which actions a caller is offered. They are not a
//! security boundary on their own: the hosted database's row-level
//! security and server-side functions remain authoritative.

use super::permission_set::PermissionSet;
use super::types::{Member, PermissionAction};

/// The permissions an action requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirements {
    pub required_permissions: Vec<String>,
}

impl AccessRequirements {
    /// No requirements. Any present member passes.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(actions: &[PermissionAction]) -> Self {
        Self {
            required_permissions: actions.iter().map(|a| a.as_str().to_owned()).collect(),
        }
    }

    #[must_use]
    pub fn require(mut self, action: PermissionAction) -> Self {
        self.required_permissions.push(action.as_str().to_owned());
        self
    }

    /// Adds a raw action string, for permissions outside the known vocabulary.
    #[must_use]
    pub fn require_raw(mut self, action: impl Into<String>) -> Self {
        self.required_permissions.push(action.into());
        self
    }
}

/// Returns true iff `member` is present and every required permission
/// appears among `member.role.permissions[].permission.action`.
pub fn check_access(member: Option<&Member>, requirements: &AccessRequirements) -> bool {
    let Some(member) = member else {
        return false;
    };

    PermissionSet::from(member).allows_all(&requirements.required_permissions)
}
