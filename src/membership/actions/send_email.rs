use chrono::Utc;

use super::{check_token, report};
use crate::events::{dispatch, InvitationEvent};
use crate::mailer::{InvitationEmail, InvitationEmailData, InvitationMailer};
use crate::validators::{normalize_email, validate_display_name, validate_email};
use crate::{ErrorCode, OperationError};

const OPERATION: &str = "send_invitation_email";

/// Renders and delivers the invitation email for an already created
/// invitation.
pub struct SendInvitationEmailAction<N: InvitationMailer> {
    mailer: N,
    app_url: String,
}

impl<N: InvitationMailer> SendInvitationEmailAction<N> {
    pub fn new(mailer: N, app_url: impl Into<String>) -> Self {
        Self {
            mailer,
            app_url: app_url.into(),
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "send_invitation_email", skip_all, err)
    )]
    pub async fn execute(&self, data: InvitationEmailData) -> Result<InvitationEmail, OperationError> {
        match self.run(data).await {
            Ok(email) => Ok(email),
            Err(err) => Err(report(err).await),
        }
    }

    async fn run(&self, mut data: InvitationEmailData) -> Result<InvitationEmail, OperationError> {
        data.email = normalize_email(&data.email);
        data.organization_name = data.organization_name.trim().to_owned();
        data.inviter_name = data.inviter_name.trim().to_owned();
        validate_email(&data.email).map_err(|e| OperationError::validation(OPERATION, e.to_string()))?;
        check_token(OPERATION, &data.token)?;
        validate_display_name("Organization name", &data.organization_name)
            .map_err(|e| OperationError::validation(OPERATION, e.to_string()))?;
        validate_display_name("Inviter name", &data.inviter_name)
            .map_err(|e| OperationError::validation(OPERATION, e.to_string()))?;

        let email = InvitationEmail::render(&data, &self.app_url).map_err(|e| {
            log::error!(target: "orgkit", "msg=\"cannot render invitation email\", error=\"{e}\"");
            OperationError::new(
                OPERATION,
                ErrorCode::CreateFailed,
                e.to_string(),
                "Failed to send invitation email",
            )
        })?;

        self.mailer.send(&email).await.map_err(|e| {
            log::error!(
                target: "orgkit",
                "msg=\"invitation email failed\", to=\"{}\", error=\"{e}\"",
                email.to
            );
            OperationError::new(
                OPERATION,
                ErrorCode::CreateFailed,
                e.to_string(),
                "Failed to send invitation email",
            )
        })?;

        dispatch(InvitationEvent::InvitationEmailSent {
            email: email.to.clone(),
            organization_name: data.organization_name.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::{MailerError, MockMailer};
    use crate::membership::MembershipType;
    use crate::SecretString;

    fn data() -> InvitationEmailData {
        InvitationEmailData {
            email: " Invitee@Example.com ".to_owned(),
            token: SecretString::new("abc123"),
            organization_name: "Acme".to_owned(),
            inviter_name: "Dana".to_owned(),
            membership_type: MembershipType::Team,
        }
    }

    #[tokio::test]
    async fn test_sends_rendered_email() {
        let mailer = MockMailer::new();
        let action = SendInvitationEmailAction::new(mailer.clone(), "https://app.example.com");

        let email = action.execute(data()).await.unwrap();

        assert_eq!(email.to, "invitee@example.com");
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "You've been invited to join Acme");
    }

    #[tokio::test]
    async fn test_rejects_blank_names() {
        let mailer = MockMailer::new();
        let action = SendInvitationEmailAction::new(mailer.clone(), "https://app.example.com");

        let mut blank = data();
        blank.inviter_name = "  ".to_owned();
        let err = action.execute(blank).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure() {
        let mailer = MockMailer::new();
        mailer.set_failure(Some(MailerError::Rejected {
            status: 422,
            body: "bad sender".to_owned(),
        }));
        let action = SendInvitationEmailAction::new(mailer, "https://app.example.com");

        let err = action.execute(data()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CreateFailed);
        assert_eq!(err.message, "Failed to send invitation email");
    }
}
