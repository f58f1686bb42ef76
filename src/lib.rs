//! Organization membership and invitations over a hosted Postgres backend.
//!
//! The hosted database owns the data and the invitation procedures
//! (`invite_org_member`, `validate_invitation_token`, `process_invitation`,
//! `revoke_invitation`). This crate wraps them behind
//! [`InvitationRepository`], adds role-based permission checks and the
//! invite gate, and exposes everything as actions and an axum router.
//!
//! ```rust,ignore
//! use orgkit::membership::{InviteMemberAction, InviteMemberInput, MembershipType};
//! use orgkit::postgres::{connect, create_repositories};
//!
//! let pool = connect(&database_url, &config.backend).await?;
//! let (invitations, members) = create_repositories(pool);
//!
//! let output = InviteMemberAction::new(invitations, members)
//!     .execute(InviteMemberInput {
//!         organization_id,
//!         email: "new.hire@example.com".into(),
//!         membership_type: MembershipType::Client,
//!         role_id,
//!         invited_by,
//!         team_id: Some(workspace_id),
//!         expires_at: None,
//!     })
//!     .await?;
//! ```

pub mod api;
pub mod config;
pub mod crypto;
mod error;
pub mod events;
pub mod mailer;
pub mod membership;
#[cfg(feature = "sqlx_postgres")]
pub mod postgres;
pub mod rest;
mod secret;
pub mod validators;

pub use error::{BackendError, ErrorCode, OperationError};
pub use events::{register_event_listeners, InvitationEvent};
pub use membership::{
    check_access, AccessRequirements, Invitation, InvitationRepository, Member,
    MemberRepository, MembershipType,
};
pub use secret::SecretString;
