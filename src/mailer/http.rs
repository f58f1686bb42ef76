use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{InvitationEmail, InvitationMailer, MailerError};
use crate::config::MailerConfig;
use crate::SecretString;

/// Delivers invitations through an HTTP email API that accepts
/// `{from, to, subject, html, text}` with a bearer key.
#[derive(Clone)]
pub struct HttpMailer {
    http: Client,
    api_url: String,
    api_key: SecretString,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(
        api_url: impl Into<String>,
        api_key: SecretString,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MailerError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key,
            from: from.into(),
        })
    }

    /// Returns `None` when no delivery API is configured.
    pub fn from_config(config: &MailerConfig, timeout: Duration) -> Result<Option<Self>, MailerError> {
        match (&config.api_url, &config.api_key) {
            (Some(url), Some(key)) => {
                Self::new(url.clone(), key.clone(), config.from_address.clone(), timeout).map(Some)
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl InvitationMailer for HttpMailer {
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "send_invitation_email", skip_all, err))]
    async fn send(&self, email: &InvitationEmail) -> Result<(), MailerError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&SendRequest {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                html: &email.html,
                text: &email.text,
            })
            .send()
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!(
                target: "orgkit",
                "msg=\"email delivery rejected\", status={}, body=\"{body}\"",
                status.as_u16()
            );
            return Err(MailerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::info!(target: "orgkit", "msg=\"invitation email sent\", to=\"{}\"", email.to);
        Ok(())
    }
}
