use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::report;
use crate::config::InvitationConfig;
use crate::events::{dispatch, InvitationEvent};
use crate::membership::invite_gate::{
    can_invite_as, evaluate_invite_form, NO_INVITE_PERMISSION_ERROR,
};
use crate::membership::{
    InvitationCache, InvitationRepository, InviteOrgMember, MemberRepository, MembershipType,
    RoleName,
};
use crate::validators::{normalize_email, validate_email};
use crate::{ErrorCode, OperationError, SecretString};

const OPERATION: &str = "invite_org_member";

/// Input data for inviting someone to an organization.
#[derive(Debug, Clone)]
pub struct InviteMemberInput {
    pub organization_id: Uuid,
    pub email: String,
    pub membership_type: MembershipType,
    pub role_id: Uuid,
    pub invited_by: Uuid,
    /// Workspace the invitee joins. Required for client memberships.
    pub team_id: Option<Uuid>,
    /// Defaults to now plus [`InvitationConfig::expiry`].
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteMemberOutput {
    /// Returned once so the caller can deliver it (see the send-email route).
    pub token: SecretString,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Invites someone to an organization.
///
/// This action:
/// 1. Normalizes and validates the email, workspace and expiry
/// 2. Loads the inviter and applies the membership-type gate
/// 3. Refuses when a pending invitation for the same email exists
/// 4. Calls `invite_org_member` and invalidates the organization's cached list
///
/// Steps 3 and 4 are not atomic. Two concurrent invites for the same
/// address can both pass the pre-check; only a uniqueness constraint in
/// the hosted schema closes that window.
pub struct InviteMemberAction<I, M>
where
    I: InvitationRepository,
    M: MemberRepository,
{
    invitation_repo: I,
    member_repo: M,
    config: InvitationConfig,
    cache: Option<InvitationCache>,
}

impl<I: InvitationRepository, M: MemberRepository> InviteMemberAction<I, M> {
    pub fn new(invitation_repo: I, member_repo: M) -> Self {
        Self::with_config(invitation_repo, member_repo, InvitationConfig::default())
    }

    pub fn with_config(invitation_repo: I, member_repo: M, config: InvitationConfig) -> Self {
        Self {
            invitation_repo,
            member_repo,
            config,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: InvitationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// # Returns
    ///
    /// - `Ok(output)` - invitation created, token ready for delivery
    /// - `VALIDATION_FAILED` - bad email, missing workspace or past expiry
    /// - `PERMISSION_DENIED` - inviter may not hand out this membership type
    /// - `CONFLICT` - a pending invitation already exists for the email
    /// - `READ_FAILED` / `CREATE_FAILED` - backend failures
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "invite_org_member", skip_all, err)
    )]
    pub async fn execute(&self, input: InviteMemberInput) -> Result<InviteMemberOutput, OperationError> {
        match self.run(input).await {
            Ok(output) => Ok(output),
            Err(err) => Err(report(err).await),
        }
    }

    /// Resolves a role name to the id `invite_org_member` expects.
    ///
    /// # Returns
    ///
    /// - `NOT_FOUND` - the `roles` table has no role with that name
    /// - `READ_FAILED` - backend failure
    pub async fn resolve_role(&self, name: RoleName) -> Result<Uuid, OperationError> {
        let role = match self.member_repo.find_role_by_name(name.as_str()).await {
            Ok(role) => role,
            Err(e) => {
                let err = OperationError::backend(
                    OPERATION,
                    ErrorCode::ReadFailed,
                    format!("loading role {}", name.as_str()),
                    "Failed to load roles",
                    e,
                );
                return Err(report(err).await);
            }
        };

        match role {
            Some(role) => Ok(role.id),
            None => Err(report(OperationError::new(
                OPERATION,
                ErrorCode::NotFound,
                format!("role {} missing", name.as_str()),
                "The selected role does not exist",
            ))
            .await),
        }
    }

    async fn run(&self, input: InviteMemberInput) -> Result<InviteMemberOutput, OperationError> {
        let email = normalize_email(&input.email);
        validate_email(&email).map_err(|e| OperationError::validation(OPERATION, e.to_string()))?;

        if input.membership_type == MembershipType::Client && input.team_id.is_none() {
            return Err(OperationError::validation(
                OPERATION,
                "A workspace is required for client invitations",
            ));
        }

        let now = Utc::now();
        let expires_at = input.expires_at.unwrap_or(now + self.config.expiry);
        if expires_at <= now {
            return Err(OperationError::validation(
                OPERATION,
                "The expiry date must be in the future",
            ));
        }

        let inviter = self
            .member_repo
            .find_member(input.organization_id, input.invited_by)
            .await
            .map_err(|e| {
                OperationError::backend(
                    OPERATION,
                    ErrorCode::ReadFailed,
                    format!("loading inviter {}", input.invited_by),
                    "Failed to load your membership",
                    e,
                )
            })?;

        if !can_invite_as(inviter.as_ref(), input.membership_type) {
            let form = evaluate_invite_form(inviter.as_ref(), input.membership_type);
            let message = form.error.unwrap_or(NO_INVITE_PERMISSION_ERROR);
            return Err(OperationError::new(
                OPERATION,
                ErrorCode::PermissionDenied,
                format!(
                    "user {} may not invite {} members",
                    input.invited_by, input.membership_type
                ),
                message,
            ));
        }

        let existing = self
            .invitation_repo
            .find_pending(input.organization_id, &email)
            .await
            .map_err(|e| {
                OperationError::backend(
                    OPERATION,
                    ErrorCode::ReadFailed,
                    "checking for an existing invitation",
                    "Failed to check existing invitations",
                    e,
                )
            })?;

        if existing.is_some() {
            return Err(OperationError::new(
                OPERATION,
                ErrorCode::Conflict,
                format!("pending invitation exists in organization {}", input.organization_id),
                format!("An invitation has already been sent to {email}"),
            ));
        }

        let token = self
            .invitation_repo
            .invite_org_member(InviteOrgMember {
                organization_id: input.organization_id,
                membership_type: input.membership_type,
                email: email.clone(),
                role_id: input.role_id,
                invited_by: input.invited_by,
                expires_at,
                team_id: input.team_id,
            })
            .await
            .map_err(|e| {
                OperationError::backend(
                    OPERATION,
                    ErrorCode::CreateFailed,
                    format!("organization {}", input.organization_id),
                    "Failed to send invitation",
                    e,
                )
            })?;

        if let Some(cache) = &self.cache {
            cache.invalidate(input.organization_id);
        }

        log::info!(
            target: "orgkit",
            "msg=\"invitation created\", organization_id={}, membership_type={}, email=\"{}\"",
            input.organization_id,
            input.membership_type,
            email
        );

        dispatch(InvitationEvent::InvitationCreated {
            organization_id: input.organization_id,
            email: email.clone(),
            membership_type: input.membership_type,
            invited_by: input.invited_by,
            at: Utc::now(),
        })
        .await;

        Ok(InviteMemberOutput {
            token,
            email,
            expires_at,
        })
    }
}
