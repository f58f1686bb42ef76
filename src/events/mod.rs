//! Event system for invitation actions.
//!
//! Actions always fire events. Without registered listeners they are
//! dropped.
//!
//! ```rust,ignore
//! use orgkit::register_event_listeners;
//! use orgkit::events::listeners::LoggingListener;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```
//!
//! Custom listeners implement [`Listener`]:
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use orgkit::events::{InvitationEvent, Listener};
//!
//! struct AuditTrail;
//!
//! #[async_trait]
//! impl Listener for AuditTrail {
//!     async fn handle(&self, event: &InvitationEvent) {
//!         if let InvitationEvent::InvitationAccepted { user_id, .. } = event {
//!             // record the new member
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::InvitationEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners, EventRegistry};
