//! `PostgreSQL` implementation of [`InvitationRepository`].
//!
//! The four invitation procedures are SQL functions installed in the hosted
//! database; they are called with named `p_*` arguments so the argument
//! order of the function definitions does not matter.
//!
//! `membership_type` is sent as `text`, so `invite_org_member` must declare
//! `p_membership_type text` and cast it to the column type itself. Postgres
//! applies no implicit text to enum cast when resolving a function. Reads
//! select the column as `::text`, which works whether it is an enum or text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::db_error;
use crate::membership::{Invitation, InvitationDetails, InvitationRepository, InviteOrgMember};
use crate::{BackendError, SecretString};

/// PostgreSQL-backed invitation repository.
#[derive(Clone)]
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INVITATION_COLUMNS: &str = "id, email, organization_id, team_id, role_id, \
    membership_type::text AS membership_type, token, expires_at, accepted_at, invited_by, created_at";

#[derive(FromRow)]
struct InvitationRecord {
    id: Uuid,
    email: String,
    organization_id: Uuid,
    team_id: Option<Uuid>,
    role_id: Uuid,
    membership_type: String,
    token: String,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    invited_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvitationRecord> for Invitation {
    type Error = BackendError;

    fn try_from(row: InvitationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            organization_id: row.organization_id,
            team_id: row.team_id,
            role_id: row.role_id,
            membership_type: row.membership_type.parse()?,
            token: SecretString::new(row.token),
            expires_at: row.expires_at,
            accepted_at: row.accepted_at,
            invited_by: row.invited_by,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct DetailsRecord {
    invitation_id: Uuid,
    email: String,
    organization_id: Uuid,
    organization_name: Option<String>,
    team_id: Option<Uuid>,
    role_id: Uuid,
    role_name: Option<String>,
    membership_type: String,
    expires_at: DateTime<Utc>,
}

impl TryFrom<DetailsRecord> for InvitationDetails {
    type Error = BackendError;

    fn try_from(row: DetailsRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            invitation_id: row.invitation_id,
            email: row.email,
            organization_id: row.organization_id,
            organization_name: row.organization_name,
            team_id: row.team_id,
            role_id: row.role_id,
            role_name: row.role_name,
            membership_type: row.membership_type.parse()?,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn invite_org_member(&self, data: InviteOrgMember) -> Result<SecretString, BackendError> {
        let token: Option<String> = sqlx::query_scalar(
            r"
            SELECT invite_org_member(
                p_organization_id => $1,
                p_membership_type => $2,
                p_email => $3,
                p_role_id => $4,
                p_invited_by => $5,
                p_expires_at => $6,
                p_team_id => $7
            )::text
            ",
        )
        .bind(data.organization_id)
        .bind(data.membership_type.as_str())
        .bind(&data.email)
        .bind(data.role_id)
        .bind(data.invited_by)
        .bind(data.expires_at)
        .bind(data.team_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("invite_org_member"))?;

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
        let row: Option<DetailsRecord> = sqlx::query_as(
            r"
            SELECT invitation_id, email, organization_id, organization_name, team_id,
                   role_id, role_name, membership_type::text AS membership_type, expires_at
            FROM validate_invitation_token(p_token => $1)
            LIMIT 1
            ",
        )
        .bind(token.expose_secret())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("validate_invitation_token"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn process_invitation(
        &self,
        token: &SecretString,
        user_id: Uuid,
    ) -> Result<bool, BackendError> {
        let accepted: Option<bool> =
            sqlx::query_scalar("SELECT process_invitation(p_token => $1, p_user_id => $2)")
                .bind(token.expose_secret())
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("process_invitation"))?;

        Ok(accepted.unwrap_or(false))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn revoke_invitation(&self, token: &SecretString) -> Result<bool, BackendError> {
        let revoked: Option<bool> = sqlx::query_scalar("SELECT revoke_invitation(p_token => $1)")
            .bind(token.expose_secret())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("revoke_invitation"))?;

        Ok(revoked.unwrap_or(false))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Invitation>, BackendError> {
        let rows: Vec<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE organization_id = $1 AND accepted_at IS NULL \
             ORDER BY created_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find_invitations_by_organization"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_pending(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> Result<Option<Invitation>, BackendError> {
        let row: Option<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE organization_id = $1 AND lower(email) = lower($2) \
             AND accepted_at IS NULL AND expires_at > NOW() \
             LIMIT 1"
        ))
        .bind(organization_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_pending_invitation"))?;

        row.map(TryInto::try_into).transpose()
    }
}
