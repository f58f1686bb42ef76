//! Organization membership: roles, permission checks and invitations.
//!
//! Members belong to an organization either as `team` members (full
//! access) or `client` members (scoped to one workspace). Each member has
//! a role, and each role grants a set of permission actions. Invitations
//! are created, validated, accepted and revoked through remote procedures
//! on the hosted database, behind [`InvitationRepository`].

pub mod access;
pub mod actions;
mod cache;
pub mod invite_gate;
#[cfg(any(test, feature = "mocks"))]
mod mocks;
mod permission_set;
mod repository;
mod types;

pub use access::{check_access, AccessRequirements};
pub use actions::{
    InviteMemberAction, InviteMemberInput, InviteMemberOutput, ListInvitationsAction,
    ProcessInvitationAction, RevokeInvitationAction, SendInvitationEmailAction,
    ValidateInvitationAction,
};
pub use cache::InvitationCache;
pub use invite_gate::{
    allowed_membership_types, can_invite_as, evaluate_invite_form, InviteFormState,
};
#[cfg(any(test, feature = "mocks"))]
pub use mocks::{MockInvitationRepository, MockMemberRepository};
pub use permission_set::PermissionSet;
pub use repository::{InvitationRepository, InviteOrgMember, MemberRepository};
pub use types::{
    Invitation, InvitationDetails, Member, MemberRole, MembershipType, PermissionAction,
    PermissionRef, Role, RoleName, RolePermission, UnknownValue,
};
