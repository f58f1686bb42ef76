use async_trait::async_trait;

use crate::events::{InvitationEvent, Listener};

/// Logs invitation events through the `log` crate.
///
/// Failures are logged at `Warn` regardless of the configured level.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &InvitationEvent) {
        let level = if event.is_failure() {
            log::Level::Warn
        } else {
            self.level
        };

        log::log!(
            target: "orgkit::events",
            level,
            "event={} {:?}",
            event.name(),
            event
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(LoggingListener::default().level, log::Level::Info);
        assert_eq!(
            LoggingListener::with_level(log::Level::Debug).level,
            log::Level::Debug
        );
    }

    #[tokio::test]
    async fn test_handle() {
        let listener = LoggingListener::new();
        listener
            .handle(&InvitationEvent::InvitationRevoked { at: Utc::now() })
            .await;
    }
}
