use chrono::Utc;

use super::{check_token, report};
use crate::events::{dispatch, InvitationEvent};
use crate::membership::{InvitationDetails, InvitationRepository};
use crate::{ErrorCode, OperationError, SecretString};

const OPERATION: &str = "validate_invitation_token";

pub const INVALID_INVITATION_MESSAGE: &str = "This invitation is invalid or has expired";

/// Resolves an invitation token to the invitation it grants.
///
/// Unknown, expired and already-accepted tokens are indistinguishable to
/// the caller: all yield `NOT_FOUND`.
pub struct ValidateInvitationAction<I: InvitationRepository> {
    invitation_repo: I,
}

impl<I: InvitationRepository> ValidateInvitationAction<I> {
    pub fn new(invitation_repo: I) -> Self {
        Self { invitation_repo }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "validate_invitation_token", skip_all, err)
    )]
    pub async fn execute(&self, token: &SecretString) -> Result<InvitationDetails, OperationError> {
        match self.run(token).await {
            Ok(details) => Ok(details),
            Err(err) => Err(report(err).await),
        }
    }

    async fn run(&self, token: &SecretString) -> Result<InvitationDetails, OperationError> {
        check_token(OPERATION, token)?;

        let details = self
            .invitation_repo
            .validate_invitation_token(token)
            .await
            .map_err(|e| {
                OperationError::backend(
                    OPERATION,
                    ErrorCode::ReadFailed,
                    "token lookup",
                    "Failed to validate invitation",
                    e,
                )
            })?
            .ok_or_else(|| {
                OperationError::new(
                    OPERATION,
                    ErrorCode::NotFound,
                    "no usable invitation for token",
                    INVALID_INVITATION_MESSAGE,
                )
            })?;

        dispatch(InvitationEvent::InvitationValidated {
            invitation_id: details.invitation_id,
            organization_id: details.organization_id,
            at: Utc::now(),
        })
        .await;

        Ok(details)
    }
}
