use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::config::OrgkitConfig;
use crate::mailer::InvitationMailer;
use crate::membership::{InvitationCache, InvitationRepository, MemberRepository};

#[derive(Clone)]
pub struct AppState<I, M, N> {
    pub invitation_repo: I,
    pub member_repo: M,
    pub mailer: N,
    pub cache: InvitationCache,
    pub config: Arc<OrgkitConfig>,
}

impl<I, M, N> AppState<I, M, N> {
    /// The cache lifetime comes from `config.invitations.cache_ttl`.
    pub fn new(invitation_repo: I, member_repo: M, mailer: N, config: OrgkitConfig) -> Self {
        Self {
            invitation_repo,
            member_repo,
            mailer,
            cache: InvitationCache::new(config.invitations.cache_ttl),
            config: Arc::new(config),
        }
    }
}

/// `GET /health`
pub fn health_routes<I, M, N>() -> Router<AppState<I, M, N>>
where
    I: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(handlers::health))
}

/// Invitation routes under `/api`. Validating a token is public; every
/// other route requires the service key.
pub fn invitation_routes<I, M, N>() -> Router<AppState<I, M, N>>
where
    I: InvitationRepository + Clone + 'static,
    M: MemberRepository + Clone + 'static,
    N: InvitationMailer + Clone,
{
    Router::new()
        .route(
            "/api/invitations/send-email",
            post(handlers::send_invitation_email::<I, M, N>),
        )
        .route(
            "/api/invitations/accept",
            post(handlers::accept_invitation::<I, M, N>),
        )
        .route(
            "/api/invitations/{token}",
            get(handlers::validate_invitation::<I, M, N>)
                .delete(handlers::revoke_invitation::<I, M, N>),
        )
        .route(
            "/api/organizations/{organization_id}/invitations",
            get(handlers::list_invitations::<I, M, N>)
                .post(handlers::create_invitation::<I, M, N>),
        )
}

/// Health plus invitation routes.
pub fn app_routes<I, M, N>() -> Router<AppState<I, M, N>>
where
    I: InvitationRepository + Clone + 'static,
    M: MemberRepository + Clone + 'static,
    N: InvitationMailer + Clone,
{
    Router::new()
        .merge(health_routes())
        .merge(invitation_routes())
}
