use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::membership::MembershipType;
use crate::ErrorCode;

/// Events emitted by invitation actions.
///
/// Success events correspond to the confirmations a user sees after an
/// action; [`InvitationEvent::OperationFailed`] carries the user-facing
/// message of a failed one. Events are dropped when no listeners are
/// registered via [`register_event_listeners`](crate::register_event_listeners).
#[derive(Debug, Clone)]
pub enum InvitationEvent {
    InvitationCreated {
        organization_id: Uuid,
        email: String,
        membership_type: MembershipType,
        invited_by: Uuid,
        at: DateTime<Utc>,
    },
    InvitationValidated {
        invitation_id: Uuid,
        organization_id: Uuid,
        at: DateTime<Utc>,
    },
    InvitationAccepted {
        user_id: Uuid,
        at: DateTime<Utc>,
    },
    InvitationRevoked {
        at: DateTime<Utc>,
    },
    InvitationEmailSent {
        email: String,
        organization_name: String,
        at: DateTime<Utc>,
    },
    OperationFailed {
        operation: &'static str,
        code: ErrorCode,
        message: String,
        at: DateTime<Utc>,
    },
}

impl InvitationEvent {
    /// Dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvitationCreated { .. } => "invitation.created",
            Self::InvitationValidated { .. } => "invitation.validated",
            Self::InvitationAccepted { .. } => "invitation.accepted",
            Self::InvitationRevoked { .. } => "invitation.revoked",
            Self::InvitationEmailSent { .. } => "invitation.email_sent",
            Self::OperationFailed { .. } => "invitation.operation_failed",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::InvitationCreated { at, .. }
            | Self::InvitationValidated { at, .. }
            | Self::InvitationAccepted { at, .. }
            | Self::InvitationRevoked { at }
            | Self::InvitationEmailSent { at, .. }
            | Self::OperationFailed { at, .. } => *at,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::OperationFailed { .. })
    }
}
