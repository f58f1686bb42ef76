//! Which membership types an inviter may hand out.
//!
//! Client administrators can only bring people into client (single
//! workspace) memberships. Team administrators, who hold both
//! `manage_organization` and `manage_team`, may choose either type.

use serde::Serialize;

use super::access::{check_access, AccessRequirements};
use super::types::{Member, MembershipType, PermissionAction};

pub const CLIENT_ADMIN_TEAM_INVITE_ERROR: &str =
    "As a client administrator, you can only invite users to client organizations";

pub const NO_INVITE_PERMISSION_ERROR: &str = "You do not have permission to invite members";

/// Permissions needed to offer a membership type.
pub fn invite_requirements(membership_type: MembershipType) -> AccessRequirements {
    match membership_type {
        MembershipType::Team => AccessRequirements::of(&[
            PermissionAction::ManageOrganization,
            PermissionAction::ManageTeam,
        ]),
        MembershipType::Client => AccessRequirements::of(&[PermissionAction::ManageTeam]),
    }
}

/// True when `inviter` may invite someone with `membership_type`.
///
/// Team invitations additionally require the inviter to be a team member
/// themselves; a client-scoped member never grants organization-wide access.
pub fn can_invite_as(inviter: Option<&Member>, membership_type: MembershipType) -> bool {
    if membership_type == MembershipType::Team
        && inviter.is_some_and(|m| m.membership_type != MembershipType::Team)
    {
        return false;
    }

    check_access(inviter, &invite_requirements(membership_type))
}

/// Membership types the inviter may choose from, in display order.
pub fn allowed_membership_types(inviter: Option<&Member>) -> Vec<MembershipType> {
    MembershipType::ALL
        .into_iter()
        .filter(|t| can_invite_as(inviter, *t))
        .collect()
}

/// What the invite form shows for a given inviter and requested type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteFormState {
    /// The requested type, kept even when it is not allowed.
    pub membership_type: MembershipType,
    /// Label displayed in the selector.
    pub membership_type_label: &'static str,
    pub selector_disabled: bool,
    pub allowed_types: Vec<MembershipType>,
    pub error: Option<&'static str>,
    pub submit_disabled: bool,
}

impl InviteFormState {
    pub fn is_allowed(&self) -> bool {
        self.error.is_none()
    }
}

/// Evaluates the invite form for `inviter` requesting `requested`.
pub fn evaluate_invite_form(inviter: Option<&Member>, requested: MembershipType) -> InviteFormState {
    let allowed_types = allowed_membership_types(inviter);

    let error = if allowed_types.is_empty() {
        Some(NO_INVITE_PERMISSION_ERROR)
    } else if !allowed_types.contains(&requested) {
        // only client invitations are left at this point
        Some(CLIENT_ADMIN_TEAM_INVITE_ERROR)
    } else {
        None
    };

    InviteFormState {
        membership_type: requested,
        membership_type_label: requested.label(),
        selector_disabled: allowed_types.len() < 2,
        allowed_types,
        error,
        submit_disabled: error.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_admin() -> Member {
        Member::new(MembershipType::Client, "admin").with_permission("manage_team")
    }

    fn team_admin() -> Member {
        Member::new(MembershipType::Team, "admin")
            .with_permission("manage_organization")
            .with_permission("manage_team")
    }

    #[test]
    fn test_client_admin_limited_to_client() {
        let admin = client_admin();
        assert!(!can_invite_as(Some(&admin), MembershipType::Team));
        assert!(can_invite_as(Some(&admin), MembershipType::Client));
        assert_eq!(allowed_membership_types(Some(&admin)), vec![MembershipType::Client]);
    }

    #[test]
    fn test_team_admin_can_choose_either() {
        let admin = team_admin();
        assert_eq!(
            allowed_membership_types(Some(&admin)),
            vec![MembershipType::Team, MembershipType::Client]
        );

        let form = evaluate_invite_form(Some(&admin), MembershipType::Team);
        assert!(!form.selector_disabled);
        assert!(form.is_allowed());
        assert!(!form.submit_disabled);
    }

    #[test]
    fn test_client_member_with_org_permission_still_cannot_invite_team() {
        let member = Member::new(MembershipType::Client, "admin")
            .with_permission("manage_organization")
            .with_permission("manage_team");
        assert!(!can_invite_as(Some(&member), MembershipType::Team));
    }

    #[test]
    fn test_client_admin_requesting_team_is_blocked() {
        let form = evaluate_invite_form(Some(&client_admin()), MembershipType::Team);

        assert!(form.selector_disabled);
        assert_eq!(form.membership_type_label, "Team");
        assert_eq!(form.error, Some(CLIENT_ADMIN_TEAM_INVITE_ERROR));
        assert!(form.submit_disabled);
    }

    #[test]
    fn test_client_admin_requesting_client_is_allowed() {
        let form = evaluate_invite_form(Some(&client_admin()), MembershipType::Client);

        assert!(form.selector_disabled);
        assert_eq!(form.membership_type_label, "Client");
        assert!(form.error.is_none());
        assert!(!form.submit_disabled);
    }

    #[test]
    fn test_no_member_or_no_permission() {
        for inviter in [None, Some(Member::new(MembershipType::Team, "member"))] {
            let form = evaluate_invite_form(inviter.as_ref(), MembershipType::Client);
            assert!(form.allowed_types.is_empty());
            assert_eq!(form.error, Some(NO_INVITE_PERMISSION_ERROR));
            assert!(form.selector_disabled);
            assert!(form.submit_disabled);
        }
    }
}
