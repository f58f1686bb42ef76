use async_trait::async_trait;

use super::{InvitationEmail, InvitationMailer, MailerError};

/// Writes invitation emails to the log instead of sending them.
///
/// The accept link contains the invitation token, so this mailer is only
/// meant for local development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl InvitationMailer for LogMailer {
    async fn send(&self, email: &InvitationEmail) -> Result<(), MailerError> {
        log::info!(
            target: "orgkit",
            "msg=\"invitation email (not sent)\", to=\"{}\", subject=\"{}\", accept_url=\"{}\"",
            email.to,
            email.subject,
            email.accept_url
        );
        Ok(())
    }
}
