mod cors;
mod error;
mod handlers;
mod middleware;
mod routes;
#[cfg(feature = "tracing")]
mod trace;

pub use cors::{default as default_cors, permissive as permissive_cors};
pub use error::{status_for, AppError};
pub use middleware::{extract_bearer_token, ServiceCaller};
pub use routes::{app_routes, health_routes, invitation_routes, AppState};
#[cfg(feature = "tracing")]
pub use trace::{route_template, trace_layer, RouteSpan, UNMATCHED_ROUTE};
