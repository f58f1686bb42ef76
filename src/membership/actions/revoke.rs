use chrono::Utc;

use super::{check_token, report};
use crate::events::{dispatch, InvitationEvent};
use crate::membership::{InvitationCache, InvitationRepository};
use crate::{ErrorCode, OperationError, SecretString};

const OPERATION: &str = "revoke_invitation";

/// Deletes a pending invitation. Accepted invitations are kept.
pub struct RevokeInvitationAction<I: InvitationRepository> {
    invitation_repo: I,
    cache: Option<InvitationCache>,
}

impl<I: InvitationRepository> RevokeInvitationAction<I> {
    pub fn new(invitation_repo: I) -> Self {
        Self {
            invitation_repo,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: InvitationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "revoke_invitation", skip_all, err)
    )]
    pub async fn execute(&self, token: &SecretString) -> Result<bool, OperationError> {
        match self.run(token).await {
            Ok(revoked) => Ok(revoked),
            Err(err) => Err(report(err).await),
        }
    }

    async fn run(&self, token: &SecretString) -> Result<bool, OperationError> {
        check_token(OPERATION, token)?;

        let revoked = self
            .invitation_repo
            .revoke_invitation(token)
            .await
            .map_err(|e| {
                OperationError::backend(
                    OPERATION,
                    ErrorCode::DeleteFailed,
                    "revoking by token",
                    "Failed to revoke invitation",
                    e,
                )
            })?;

        if revoked {
            if let Some(cache) = &self.cache {
                cache.invalidate_all();
            }
            log::info!(target: "orgkit", "msg=\"invitation revoked\"");
            dispatch(InvitationEvent::InvitationRevoked { at: Utc::now() }).await;
        }

        Ok(revoked)
    }
}
