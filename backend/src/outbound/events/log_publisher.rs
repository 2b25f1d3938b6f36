//! Publisher that records events in the structured log.

use async_trait::async_trait;
use tracing::info;

use crate::domain::UserEvent;
use crate::domain::ports::{UserEventPublishError, UserEventPublisher};

use super::encode_event;

/// Writes each event to the log at `info` level.
#[derive(Debug, Clone)]
pub struct LogUserEventPublisher {
    channel: String,
}

impl LogUserEventPublisher {
    /// Create a publisher labelling events with `channel`.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl UserEventPublisher for LogUserEventPublisher {
    async fn publish(&self, event: &UserEvent) -> Result<(), UserEventPublishError> {
        let payload = encode_event(event)?;
        info!(
            channel = %self.channel,
            action = event.action(),
            user_id = %event.user_id(),
            payload = %payload,
            "user event"
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), UserEventPublishError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), UserEventPublishError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[tokio::test]
    async fn publishes_without_error() {
        let publisher = LogUserEventPublisher::new("UserEvents");
        publisher
            .publish(&UserEvent::deleted(UserId::random()))
            .await
            .expect("log publish succeeds");
        publisher.close().await.expect("close succeeds");
    }
}
