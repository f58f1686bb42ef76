//! Invitation actions.
//!
//! Each action wraps one backend operation: it validates input, maps
//! backend failures to [`OperationError`], keeps the [`InvitationCache`]
//! consistent and dispatches an [`InvitationEvent`].
//!
//! [`InvitationCache`]: super::InvitationCache

mod invite;
mod list;
mod process;
mod revoke;
mod send_email;
mod validate;

pub use invite::{InviteMemberAction, InviteMemberInput, InviteMemberOutput};
pub use list::ListInvitationsAction;
pub use process::ProcessInvitationAction;
pub use revoke::RevokeInvitationAction;
pub use send_email::SendInvitationEmailAction;
pub use validate::{ValidateInvitationAction, INVALID_INVITATION_MESSAGE};

use chrono::Utc;

use crate::events::{dispatch, InvitationEvent};
use crate::validators::validate_token;
use crate::{OperationError, SecretString};

/// Dispatches the failure event and hands the error back for `?`.
async fn report(err: OperationError) -> OperationError {
    dispatch(InvitationEvent::OperationFailed {
        operation: err.operation,
        code: err.code,
        message: err.message.clone(),
        at: Utc::now(),
    })
    .await;
    err
}

fn check_token(operation: &'static str, token: &SecretString) -> Result<(), OperationError> {
    validate_token(token.expose_secret())
        .map_err(|e| OperationError::validation(operation, e.to_string()))
}
