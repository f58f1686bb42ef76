//! Request tracing that records the route template instead of the URI.
//!
//! Invitation tokens travel in paths such as `/api/invitations/{token}`, so
//! spans carry the matched route and never the concrete path.

use axum::extract::{MatchedPath, Request};
use axum::http;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;

/// Recorded for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "<unmatched>";

pub type RouteSpan = fn(&Request) -> tracing::Span;

/// The matched route template of a request, e.g. `/api/invitations/{token}`.
pub fn route_template<B>(request: &http::Request<B>) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
}

fn make_span(request: &Request) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        route = route_template(request),
    )
}

/// `TraceLayer` for the router. Add it with `Router::layer` so the matched
/// route is known when the span is created.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RouteSpan> {
    TraceLayer::new_for_http().make_span_with(make_span as RouteSpan)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::middleware::{self, Next};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn test_unrouted_request_is_unmatched() {
        let request = http::Request::new(());
        assert_eq!(route_template(&request), UNMATCHED_ROUTE);
    }

    #[tokio::test]
    async fn test_layered_middleware_sees_template_not_token() {
        let seen = Arc::new(Mutex::new(None::<String>));
        let recorder = Arc::clone(&seen);

        let app: Router = Router::new()
            .route("/api/invitations/{token}", get(|| async { "ok" }))
            .layer(middleware::from_fn(move |request: Request, next: Next| {
                let recorder = Arc::clone(&recorder);
                async move {
                    *recorder.lock().unwrap() = Some(route_template(&request).to_owned());
                    next.run(request).await
                }
            }))
            .layer(trace_layer());

        let response = app
            .oneshot(
                http::Request::builder()
                    .uri("/api/invitations/tok_secret_123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(seen.lock().unwrap().as_deref(), Some("/api/invitations/{token}"));
    }
}
