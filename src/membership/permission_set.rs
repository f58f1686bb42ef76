//! Flattened view of the permissions a member holds.

use std::collections::HashSet;

use super::types::{Member, PermissionAction};

/// The set of permission actions granted to a member through their role.
///
/// Built from the nested [`Member`] shape so that repeated checks do not
/// walk the role's permission list every time. Unknown action strings
/// are kept as-is; they only ever match an identical requirement.
///
/// ```rust
/// use orgkit::membership::{Member, MembershipType, PermissionAction, PermissionSet};
///
/// let member = Member::new(MembershipType::Team, "admin")
///     .with_permission("manage_organization")
///     .with_permission("manage_team");
///
/// let perms = PermissionSet::from(&member);
/// assert!(perms.can(PermissionAction::ManageTeam));
/// assert!(perms.allows_all(["manage_organization", "manage_team"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    actions: HashSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, action: impl Into<String>) {
        self.actions.insert(action.into());
    }

    pub fn revoke(&mut self, action: &str) {
        self.actions.remove(action);
    }

    /// Checks a known permission action.
    pub fn can(&self, action: PermissionAction) -> bool {
        self.contains(action.as_str())
    }

    /// Checks a raw action string as stored in the `permissions` table.
    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    /// True when every required action is granted. Vacuously true for an
    /// empty requirement list.
    pub fn allows_all<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        required.into_iter().all(|a| self.contains(a.as_ref()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

impl From<&Member> for PermissionSet {
    fn from(member: &Member) -> Self {
        Self {
            actions: member.permission_actions().map(ToOwned::to_owned).collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            actions: iter.into_iter().map(Into::into).collect(),
        }
    }
}
