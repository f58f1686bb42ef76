use uuid::Uuid;

use super::report;
use crate::membership::{Invitation, InvitationCache, InvitationRepository};
use crate::{ErrorCode, OperationError};

const OPERATION: &str = "list_invitations";

/// Lists an organization's open invitations, newest first, reading
/// through the [`InvitationCache`].
pub struct ListInvitationsAction<I: InvitationRepository> {
    invitation_repo: I,
    cache: InvitationCache,
}

impl<I: InvitationRepository> ListInvitationsAction<I> {
    pub fn new(invitation_repo: I, cache: InvitationCache) -> Self {
        Self {
            invitation_repo,
            cache,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "list_invitations", skip_all, fields(organization_id = %organization_id), err)
    )]
    pub async fn execute(&self, organization_id: Uuid) -> Result<Vec<Invitation>, OperationError> {
        if let Some(cached) = self.cache.get(organization_id) {
            return Ok(cached);
        }

        let generation = self.cache.generation(organization_id);
        let invitations = match self.invitation_repo.find_by_organization(organization_id).await {
            Ok(invitations) => invitations,
            Err(e) => {
                let err = OperationError::backend(
                    OPERATION,
                    ErrorCode::ReadFailed,
                    format!("organization {organization_id}"),
                    "Failed to load invitations",
                    e,
                );
                return Err(report(err).await);
            }
        };

        if !self
            .cache
            .put_if_current(organization_id, generation, invitations.clone())
        {
            log::debug!(
                target: "orgkit",
                "msg=\"invitation list changed while loading, not cached\", organization_id={organization_id}"
            );
        }
        Ok(invitations)
    }
}
