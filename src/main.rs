//! `orgkit-server`: serves the invitation API.
//!
//! Configuration is read from `ORGKIT_*` environment variables (a `.env`
//! file is loaded first when present). With `ORGKIT_REST_URL` set the
//! server talks to the hosted REST gateway, otherwise it connects to
//! `DATABASE_URL` directly.

use std::error::Error;
use std::sync::Arc;

use orgkit::api::axum::{app_routes, default_cors, trace_layer, AppState};
use orgkit::config::OrgkitConfig;
use orgkit::events::listeners::TracingListener;
use orgkit::events::EventRegistry;
use orgkit::mailer::{HttpMailer, InvitationMailer, LogMailer};
use orgkit::membership::{InvitationRepository, MemberRepository};
use orgkit::{postgres, register_event_listeners, rest};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "orgkit-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,orgkit=debug")),
        )
        .init();

    let config = OrgkitConfig::from_env()?;

    register_event_listeners(install_listeners);

    let mailer: Arc<dyn InvitationMailer> =
        match HttpMailer::from_config(&config.mailer, config.backend.request_timeout)? {
            Some(mailer) => Arc::new(mailer),
            None => {
                tracing::warn!("ORGKIT_MAILER_URL not set, invitation emails will only be logged");
                Arc::new(LogMailer)
            }
        };

    if config.backend.rest_url.is_some() {
        let client = rest::RestClient::from_config(&config.backend)?;
        tracing::info!(url = client.base_url(), "using REST gateway backend");
        let (invitations, members) = rest::create_repositories(client);
        serve(invitations, members, mailer, config).await
    } else {
        let database_url = config
            .backend
            .database_url
            .clone()
            .ok_or("either ORGKIT_REST_URL or DATABASE_URL must be set")?;
        let pool = postgres::connect(&database_url, &config.backend).await?;
        tracing::info!("using Postgres backend");
        let (invitations, members) = postgres::create_repositories(pool);
        serve(invitations, members, mailer, config).await
    }
}

// The subscriber also receives `log` records, so a `LoggingListener` here
// would print every event twice.
fn install_listeners(registry: &mut EventRegistry) {
    registry.listen(TracingListener);
}

async fn serve<I, M>(
    invitations: I,
    members: M,
    mailer: Arc<dyn InvitationMailer>,
    config: OrgkitConfig,
) -> Result<(), BoxError>
where
    I: InvitationRepository + Clone + 'static,
    M: MemberRepository + Clone + 'static,
{
    let bind_addr = config.server.bind_addr.clone();
    let cors = default_cors(&config.server.allowed_origins);

    if config.server.api_secret.is_none() {
        tracing::warn!("ORGKIT_API_SECRET not set, service routes will reject every request");
    }

    let state = AppState::new(invitations, members, mailer, config);
    let app = app_routes()
        .with_state(state)
        .layer(cors)
        .layer(trace_layer());

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "orgkit-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutting down");
}
