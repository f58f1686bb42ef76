//! CORS configuration for Axum using tower-http.

use axum::http::{header, Method};
use tower_http::cors::CorsLayer;

/// Allows any origin, method and header.
///
/// **Warning**: This is intended for development only.
pub fn permissive() -> CorsLayer {
    CorsLayer::permissive()
}

/// CORS for the invitation API.
///
/// Allows the listed origins with `GET`, `POST`, `DELETE` and `OPTIONS`
/// and the `Authorization`, `Content-Type` and `Accept` headers. Preflight
/// responses are cached for an hour. Origins that fail to parse are skipped.
pub fn default<S: AsRef<str>>(allowed_origins: &[S]) -> CorsLayer {
    let origins: Vec<_> = allowed_origins
        .iter()
        .filter_map(|s| s.as_ref().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}
