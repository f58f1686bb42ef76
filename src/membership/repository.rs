use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{Invitation, InvitationDetails, Member, MembershipType, Role};
use crate::{BackendError, SecretString};

/// Parameters of the `invite_org_member` remote procedure.
#[derive(Debug, Clone)]
pub struct InviteOrgMember {
    pub organization_id: Uuid,
    pub membership_type: MembershipType,
    pub email: String,
    pub role_id: Uuid,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub team_id: Option<Uuid>,
}

/// Invitation procedures and reads exposed by the hosted database.
///
/// Uniqueness, expiry and atomicity are enforced by the server-side
/// functions behind these calls, not by implementors.
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Calls `invite_org_member` and returns the generated token.
    ///
    /// Fails with [`BackendError::EmptyResult`] when no token comes back.
    async fn invite_org_member(&self, data: InviteOrgMember) -> Result<SecretString, BackendError>;

    /// Calls `validate_invitation_token` and returns the first row, if any.
    ///
    /// Unknown, expired and consumed tokens all yield `Ok(None)`.
    async fn validate_invitation_token(
        &self,
        token: &SecretString,
    ) -> Result<Option<InvitationDetails>, BackendError>;

    /// Calls `process_invitation`, which accepts the invitation for `user_id`.
    async fn process_invitation(
        &self,
        token: &SecretString,
        user_id: Uuid,
    ) -> Result<bool, BackendError>;

    /// Calls `revoke_invitation`.
    async fn revoke_invitation(&self, token: &SecretString) -> Result<bool, BackendError>;

    /// Non-accepted invitations of an organization, newest first.
    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Invitation>, BackendError>;

    /// A non-accepted, non-expired invitation for `email` in the organization.
    async fn find_pending(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> Result<Option<Invitation>, BackendError>;
}

/// Member and role lookups.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// The member's membership type and role with embedded permissions.
    async fn find_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, BackendError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, BackendError>;
}
