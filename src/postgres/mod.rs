//! `PostgreSQL` backend: calls the hosted invitation functions directly
//! over a connection pool.

mod invitation;
mod member;

pub use invitation::PostgresInvitationRepository;
pub use member::PostgresMemberRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::BackendConfig;
use crate::BackendError;

/// Creates both Postgres repositories from a connection pool.
pub fn create_repositories(pool: PgPool) -> (PostgresInvitationRepository, PostgresMemberRepository) {
    (
        PostgresInvitationRepository::new(pool.clone()),
        PostgresMemberRepository::new(pool),
    )
}

/// Opens a pool for `database_url` with the configured connection limit.
pub async fn connect(database_url: &str, config: &BackendConfig) -> Result<PgPool, BackendError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.request_timeout)
        .connect(database_url)
        .await
        .map_err(db_error("connect"))
}

pub(crate) fn db_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> BackendError {
    move |e| {
        log::error!(target: "orgkit", "msg=\"database error\", operation=\"{operation}\", error=\"{e}\"");
        BackendError::from(e)
    }
}
