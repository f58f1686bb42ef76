use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use super::error::AppError;
use super::routes::AppState;

/// Proof that the request carried the configured service key as a bearer
/// token. Add it as a handler argument to protect the route.
#[derive(Debug, Clone, Copy)]
pub struct ServiceCaller;

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

impl<I, M, N> FromRequestParts<AppState<I, M, N>> for ServiceCaller
where
    I: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<I, M, N>,
    ) -> Result<Self, Self::Rejection> {
        // no secret configured: service routes are closed
        let Some(secret) = state.config.server.api_secret.as_ref().filter(|s| !s.is_empty()) else {
            log::warn!(target: "orgkit", "msg=\"service route called without ORGKIT_API_SECRET configured\"");
            return Err(AppError::Unauthorized);
        };

        let presented = extract_bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;

        if bool::from(presented.as_bytes().ct_eq(secret.expose_secret().as_bytes())) {
            Ok(ServiceCaller)
        } else {
            Err(AppError::Unauthorized)
        }
    }
}
