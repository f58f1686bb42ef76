use async_trait::async_trait;

use crate::events::{InvitationEvent, Listener};

/// Emits invitation events as tracing events.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &InvitationEvent) {
        if event.is_failure() {
            tracing::warn!(target: "orgkit::events", event_name = event.name(), ?event, "invitation event");
        } else {
            tracing::info!(target: "orgkit::events", event_name = event.name(), ?event, "invitation event");
        }
    }
}
