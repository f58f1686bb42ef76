use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::membership::{Invitation, MembershipType, RoleName};
use crate::{OperationError, SecretString};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
    #[serde(default)]
    pub membership_type: MembershipType,
    /// Takes precedence over `role` when both are given.
    #[serde(default)]
    pub role_id: Option<Uuid>,
    #[serde(default)]
    pub role: Option<RoleName>,
    pub invited_by: Uuid,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInvitationRequest {
    pub token: SecretString,
    pub user_id: Uuid,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreateInvitationResponse {
    pub token: SecretString,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// An invitation as listed to organization admins. The token is omitted;
/// it is only ever returned once, on creation.
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub email: String,
    pub organization_id: Uuid,
    pub team_id: Option<Uuid>,
    pub role_id: Uuid,
    pub membership_type: MembershipType,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            expired: invitation.is_expired(),
            id: invitation.id,
            email: invitation.email,
            organization_id: invitation.organization_id,
            team_id: invitation.team_id,
            role_id: invitation.role_id,
            membership_type: invitation.membership_type,
            invited_by: invitation.invited_by,
            expires_at: invitation.expires_at,
            created_at: invitation.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AcceptInvitationResponse {
    pub accepted: bool,
}

#[derive(Debug, Serialize)]
pub struct RevokeInvitationResponse {
    pub revoked: bool,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub sent: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<&OperationError> for ErrorResponse {
    fn from(err: &OperationError) -> Self {
        Self {
            error: err.message.clone(),
            code: err.code.as_str().to_owned(),
        }
    }
}
