//! Invitation email delivery.

mod http;
mod logging;
mod message;
#[cfg(any(test, feature = "mocks"))]
mod mock;

pub use self::http::HttpMailer;
pub use logging::LogMailer;
pub use message::{InvitationEmail, InvitationEmailData};
#[cfg(any(test, feature = "mocks"))]
pub use mock::MockMailer;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    #[error("invalid app url: {0}")]
    InvalidAppUrl(String),

    #[error("email transport error: {0}")]
    Transport(String),

    #[error("email API returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait InvitationMailer: Send + Sync + 'static {
    async fn send(&self, email: &InvitationEmail) -> Result<(), MailerError>;
}

#[async_trait]
impl<T: InvitationMailer + ?Sized> InvitationMailer for std::sync::Arc<T> {
    async fn send(&self, email: &InvitationEmail) -> Result<(), MailerError> {
        (**self).send(email).await
    }
}
