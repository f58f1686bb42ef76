use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{InvitationEmail, InvitationMailer, MailerError};

/// Records every email it is asked to send.
#[derive(Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<InvitationEmail>>>,
    failure: Arc<Mutex<Option<MailerError>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail with `err` until cleared with `None`.
    pub fn set_failure(&self, err: Option<MailerError>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = err;
        }
    }

    pub fn sent(&self) -> Vec<InvitationEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl InvitationMailer for MockMailer {
    async fn send(&self, email: &InvitationEmail) -> Result<(), MailerError> {
        if let Some(err) = self.failure.lock().ok().and_then(|f| f.clone()) {
            return Err(err);
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }
}
