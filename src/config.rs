//! Configuration for the invitation layer and the HTTP server.
//!
//! ```rust
//! use orgkit::config::{InvitationConfig, OrgkitConfig};
//! use chrono::Duration;
//!
//! let config = OrgkitConfig {
//!     invitations: InvitationConfig {
//!         expiry: Duration::days(14),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
//! ```

use chrono::Duration;

use crate::SecretString;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: \"{value}\"")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0}")]
    Inconsistent(&'static str),
}

#[derive(Debug, Clone, Default)]
pub struct OrgkitConfig {
    pub invitations: InvitationConfig,
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub mailer: MailerConfig,
}

/// Invitation lifetimes and caching.
#[derive(Debug, Clone)]
pub struct InvitationConfig {
    /// Applied when the caller passes no `expires_at`. Default: 7 days.
    pub expiry: Duration,
    /// How long a listed organization's invitations stay cached. Default: 30 seconds.
    pub cache_ttl: Duration,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::days(7),
            cache_ttl: Duration::seconds(30),
        }
    }
}

/// Where the hosted database lives. Exactly one of `database_url` or
/// `rest_url` is normally set; the REST gateway wins when both are.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub rest_url: Option<String>,
    /// Service key sent as `apikey` and bearer token to the REST gateway.
    pub service_key: Option<SecretString>,
    pub request_timeout: std::time::Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            rest_url: None,
            service_key: None,
            request_timeout: std::time::Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Bearer secret required by the service routes. When unset those
    /// routes reject every request.
    pub api_secret: Option<SecretString>,
    /// CORS origins. Empty means no cross-origin access.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            api_secret: None,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Email delivery API endpoint. When unset, emails are only logged.
    pub api_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub from_address: String,
    /// Base URL of the web app; accept links point at `{app_url}/invite`.
    pub app_url: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            from_address: "invitations@localhost".to_owned(),
            app_url: "http://localhost:3000".to_owned(),
        }
    }
}

impl OrgkitConfig {
    /// Settings for local development: permissive origin, short cache.
    pub fn development() -> Self {
        Self {
            invitations: InvitationConfig {
                expiry: Duration::days(7),
                cache_ttl: Duration::seconds(5),
            },
            server: ServerConfig {
                allowed_origins: vec!["http://localhost:3000".to_owned()],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Reads `ORGKIT_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unset keys
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(days) = get("ORGKIT_INVITATION_EXPIRY_DAYS") {
            config.invitations.expiry = Duration::days(parse_positive("ORGKIT_INVITATION_EXPIRY_DAYS", &days)?);
        }
        if let Some(secs) = get("ORGKIT_CACHE_TTL_SECS") {
            let secs = secs.parse::<i64>().ok().filter(|s| *s >= 0).ok_or(ConfigError::InvalidValue {
                key: "ORGKIT_CACHE_TTL_SECS",
                value: secs.clone(),
            })?;
            config.invitations.cache_ttl = Duration::seconds(secs);
        }

        config.backend.database_url = get("ORGKIT_DATABASE_URL").or_else(|| get("DATABASE_URL"));
        config.backend.rest_url = get("ORGKIT_REST_URL").map(|u| u.trim_end_matches('/').to_owned());
        config.backend.service_key = get("ORGKIT_SERVICE_KEY").map(SecretString::new);
        if let Some(max) = get("ORGKIT_MAX_CONNECTIONS") {
            let max = parse_positive("ORGKIT_MAX_CONNECTIONS", &max)?;
            config.backend.max_connections = u32::try_from(max).map_err(|_| ConfigError::InvalidValue {
                key: "ORGKIT_MAX_CONNECTIONS",
                value: max.to_string(),
            })?;
        }
        if let Some(secs) = get("ORGKIT_REQUEST_TIMEOUT_SECS") {
            let secs = parse_positive("ORGKIT_REQUEST_TIMEOUT_SECS", &secs)?;
            config.backend.request_timeout = std::time::Duration::from_secs(secs.unsigned_abs());
        }

        if let Some(addr) = get("ORGKIT_BIND_ADDR") {
            config.server.bind_addr = addr;
        }
        config.server.api_secret = get("ORGKIT_API_SECRET").map(SecretString::new);
        if let Some(origins) = get("ORGKIT_ALLOWED_ORIGINS") {
            config.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }

        config.mailer.api_url = get("ORGKIT_MAILER_URL");
        config.mailer.api_key = get("ORGKIT_MAILER_KEY").map(SecretString::new);
        if let Some(from) = get("ORGKIT_MAIL_FROM") {
            config.mailer.from_address = from;
        }
        if let Some(app_url) = get("ORGKIT_APP_URL") {
            config.mailer.app_url = app_url.trim_end_matches('/').to_owned();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.rest_url.is_some() && self.backend.service_key.is_none() {
            return Err(ConfigError::Inconsistent(
                "ORGKIT_REST_URL requires ORGKIT_SERVICE_KEY",
            ));
        }
        if self.mailer.api_url.is_some() && self.mailer.api_key.is_none() {
            return Err(ConfigError::Inconsistent(
                "ORGKIT_MAILER_URL requires ORGKIT_MAILER_KEY",
            ));
        }
        if self.invitations.expiry <= Duration::zero() {
            return Err(ConfigError::Inconsistent("invitation expiry must be positive"));
        }
        Ok(())
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<i64, ConfigError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            key,
            value: value.to_owned(),
        })
}
