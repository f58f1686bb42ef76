use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::RestClient;
use crate::membership::{Invitation, InvitationDetails, InvitationRepository, InviteOrgMember, MembershipType};
use crate::{BackendError, SecretString};

/// Invitation repository backed by the hosted REST gateway.
#[derive(Clone)]
pub struct RestInvitationRepository {
    client: RestClient,
}

impl RestInvitationRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
struct InviteParams<'a> {
    p_organization_id: Uuid,
    p_membership_type: MembershipType,
    p_email: &'a str,
    p_role_id: Uuid,
    p_invited_by: Uuid,
    p_expires_at: DateTime<Utc>,
    p_team_id: Option<Uuid>,
}

#[derive(Serialize)]
struct TokenParams<'a> {
    p_token: &'a str,
}

#[derive(Serialize)]
struct ProcessParams<'a> {
    p_token: &'a str,
    p_user_id: Uuid,
}

#[async_trait]
impl InvitationRepository for RestInvitationRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn invite_org_member(&self, data: InviteOrgMember) -> Result<SecretString, BackendError> {
        let params = InviteParams {
            p_organization_id: data.organization_id,
            p_membership_type: data.membership_type,
            p_email: &data.email,
            p_role_id: data.role_id,
            p_invited_by: data.invited_by,
            p_expires_at: data.expires_at,
            p_team_id: data.team_id,
        };

        let token: Option<String> = self.client.rpc("invite_org_member", &params).await?;

        token
            .filter(|t| !t.is_empty())
            .map(SecretString::new)
            .ok_or(BackendError::EmptyResult("invite_org_member"))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn validate_invitation_token(
        &self,
        token: &SecretString,
    ) -> Result<Option<InvitationDetails>, BackendError> {
        let rows: Vec<InvitationDetails> = self
            .client
            .rpc(
                "validate_invitation_token",
                &TokenParams {
                    p_token: token.expose_secret(),
                },
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn process_invitation(
        &self,
        token: &SecretString,
        user_id: Uuid,
    ) -> Result<bool, BackendError> {
        let accepted: Option<bool> = self
            .client
            .rpc(
                "process_invitation",
                &ProcessParams {
                    p_token: token.expose_secret(),
                    p_user_id: user_id,
                },
            )
            .await?;

        Ok(accepted.unwrap_or(false))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn revoke_invitation(&self, token: &SecretString) -> Result<bool, BackendError> {
        let revoked: Option<bool> = self
            .client
            .rpc(
                "revoke_invitation",
                &TokenParams {
                    p_token: token.expose_secret(),
                },
            )
            .await?;

        Ok(revoked.unwrap_or(false))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Invitation>, BackendError> {
        self.client
            .select(
                "invitations",
                &[
                    ("select", "*".to_owned()),
                    ("organization_id", format!("eq.{organization_id}")),
                    ("accepted_at", "is.null".to_owned()),
                    ("order", "created_at.desc".to_owned()),
                ],
            )
            .await
    }

    /// Matches `email` exactly; addresses are stored normalized.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_pending(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> Result<Option<Invitation>, BackendError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let rows: Vec<Invitation> = self
            .client
            .select(
                "invitations",
                &[
                    ("select", "*".to_owned()),
                    ("organization_id", format!("eq.{organization_id}")),
                    ("email", format!("eq.{email}")),
                    ("accepted_at", "is.null".to_owned()),
                    ("expires_at", format!("gt.{now}")),
                    ("limit", "1".to_owned()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }
}
