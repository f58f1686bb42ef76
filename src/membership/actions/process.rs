use chrono::Utc;
use uuid::Uuid;

use super::{check_token, report};
use crate::events::{dispatch, InvitationEvent};
use crate::membership::{InvitationCache, InvitationRepository};
use crate::{ErrorCode, OperationError, SecretString};

const OPERATION: &str = "process_invitation";

/// Accepts an invitation on behalf of a signed-in user.
///
/// The backend procedure adds the membership and marks the invitation
/// accepted in one transaction. `Ok(false)` means the token was unknown,
/// expired or already used; nothing changed.
pub struct ProcessInvitationAction<I: InvitationRepository> {
    invitation_repo: I,
    cache: Option<InvitationCache>,
}

impl<I: InvitationRepository> ProcessInvitationAction<I> {
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
        tracing::instrument(name = "process_invitation", skip_all, fields(user_id = %user_id), err)
    )]
    pub async fn execute(&self, token: &SecretString, user_id: Uuid) -> Result<bool, OperationError> {
        match self.run(token, user_id).await {
            Ok(accepted) => Ok(accepted),
            Err(err) => Err(report(err).await),
        }
    }

    async fn run(&self, token: &SecretString, user_id: Uuid) -> Result<bool, OperationError> {
        check_token(OPERATION, token)?;

        let accepted = self
            .invitation_repo
            .process_invitation(token, user_id)
            .await
            .map_err(|e| {
                OperationError::backend(
                    OPERATION,
                    ErrorCode::UpdateFailed,
                    format!("user {user_id}"),
                    "Failed to accept invitation",
                    e,
                )
            })?;

        if !accepted {
            log::info!(
                target: "orgkit",
                "msg=\"invitation not accepted\", user_id={user_id}"
            );
            return Ok(false);
        }

        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }

        log::info!(target: "orgkit", "msg=\"invitation accepted\", user_id={user_id}");
        dispatch(InvitationEvent::InvitationAccepted {
            user_id,
            at: Utc::now(),
        })
        .await;

        Ok(true)
    }
}
