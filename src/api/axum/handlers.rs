//! HTTP handlers for the invitation API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use super::error::AppError;
use super::middleware::ServiceCaller;
use super::routes::AppState;
use crate::api::{
    AcceptInvitationRequest, AcceptInvitationResponse, CreateInvitationRequest,
    CreateInvitationResponse, HealthResponse, InvitationResponse, RevokeInvitationResponse,
    SendEmailResponse,
};
use crate::mailer::{InvitationEmailData, InvitationMailer};
use crate::membership::{
    InvitationRepository, InviteMemberAction, InviteMemberInput, ListInvitationsAction,
    MemberRepository, ProcessInvitationAction, RevokeInvitationAction, SendInvitationEmailAction,
    ValidateInvitationAction,
};
use crate::{OperationError, SecretString};

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Deliver the invitation email for an invitation created elsewhere.
///
/// POST /api/invitations/send-email
pub async fn send_invitation_email<I, M, N>(
    State(state): State<AppState<I, M, N>>,
    _caller: ServiceCaller,
    Json(body): Json<InvitationEmailData>,
) -> Result<impl IntoResponse, AppError>
where
    I: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    N: InvitationMailer + Clone,
{
    let action = SendInvitationEmailAction::new(state.mailer, state.config.mailer.app_url.clone());
    action.execute(body).await?;

    Ok(Json(SendEmailResponse { sent: true }))
}

/// Look up the invitation a token grants. The token itself is the secret.
///
/// GET /api/invitations/{token}
pub async fn validate_invitation<I, M, N>(
    State(state): State<AppState<I, M, N>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    I: InvitationRepository + Clone + 'static,
    M: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    let action = ValidateInvitationAction::new(state.invitation_repo);
    let details = action.execute(&SecretString::new(token)).await?;

    Ok(Json(details))
}

/// POST /api/invitations/accept
pub async fn accept_invitation<I, M, N>(
    State(state): State<AppState<I, M, N>>,
    _caller: ServiceCaller,
    Json(body): Json<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, AppError>
where
    I: InvitationRepository + Clone + 'static,
    M: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    let action = ProcessInvitationAction::new(state.invitation_repo).with_cache(state.cache);
    let accepted = action.execute(&body.token, body.user_id).await?;

    Ok(Json(AcceptInvitationResponse { accepted }))
}

/// DELETE /api/invitations/{token}
pub async fn revoke_invitation<I, M, N>(
    State(state): State<AppState<I, M, N>>,
    _caller: ServiceCaller,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    I: InvitationRepository + Clone + 'static,
    M: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    let action = RevokeInvitationAction::new(state.invitation_repo).with_cache(state.cache);
    let revoked = action.execute(&SecretString::new(token)).await?;

    Ok(Json(RevokeInvitationResponse { revoked }))
}

/// GET /api/organizations/{organization_id}/invitations
pub async fn list_invitations<I, M, N>(
    State(state): State<AppState<I, M, N>>,
    _caller: ServiceCaller,
    Path(organization_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    I: InvitationRepository + Clone + 'static,
    M: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    let action = ListInvitationsAction::new(state.invitation_repo, state.cache);
    let invitations = action.execute(organization_id).await?;

    Ok(Json(
        invitations
            .into_iter()
            .map(InvitationResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/organizations/{organization_id}/invitations
pub async fn create_invitation<I, M, N>(
    State(state): State<AppState<I, M, N>>,
    _caller: ServiceCaller,
    Path(organization_id): Path<Uuid>,
    Json(body): Json<CreateInvitationRequest>,
) -> Result<impl IntoResponse, AppError>
where
    I: InvitationRepository + Clone + 'static,
    M: MemberRepository + Clone + 'static,
    N: Clone + Send + Sync + 'static,
{
    let action = InviteMemberAction::with_config(
        state.invitation_repo,
        state.member_repo,
        state.config.invitations.clone(),
    )
    .with_cache(state.cache);

    let role_id = match (body.role_id, body.role) {
        (Some(role_id), _) => role_id,
        (None, Some(role)) => action.resolve_role(role).await?,
        (None, None) => {
            return Err(OperationError::validation("invite_org_member", "A role is required").into());
        }
    };

    let output = action
        .execute(InviteMemberInput {
            organization_id,
            email: body.email,
            membership_type: body.membership_type,
            role_id,
            invited_by: body.invited_by,
            team_id: body.team_id,
            expires_at: body.expires_at,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateInvitationResponse {
            token: output.token,
            email: output.email,
            expires_at: output.expires_at,
        }),
    ))
}
