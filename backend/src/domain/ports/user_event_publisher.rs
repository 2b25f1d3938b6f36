//! Driven port for mutation notifications.

use async_trait::async_trait;

use crate::domain::UserEvent;

use super::define_port_error;

define_port_error! {
    /// Errors raised by event publisher adapters.
    pub enum UserEventPublishError {
        /// The message bus could not be reached.
        Connection { message: String } => "event bus connection failed: {message}",
        /// The event could not be encoded.
        Serialization { message: String } => "event serialization failed: {message}",
        /// The bus refused or dropped the message.
        Delivery { message: String } => "event delivery failed: {message}",
        /// Publishing did not finish within the configured deadline.
        Timeout => "event publish timed out",
    }
}

/// Port for handing user events to a message bus.
///
/// Delivery is fire-and-forget from the caller's point of view: callers log
/// returned errors and carry on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserEventPublisher: Send + Sync {
    /// Publish one event.
    async fn publish(&self, event: &UserEvent) -> Result<(), UserEventPublishError>;

    /// Check that the bus is reachable.
    async fn ping(&self) -> Result<(), UserEventPublishError>;

    /// Flush and release bus resources.
    async fn close(&self) -> Result<(), UserEventPublishError>;
}

/// Publisher that accepts and drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserEventPublisher;

#[async_trait]
impl UserEventPublisher for FixtureUserEventPublisher {
    async fn publish(&self, _event: &UserEvent) -> Result<(), UserEventPublishError> {
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
    use rstest::rstest;

    #[rstest]
    #[case(UserEventPublishError::connection("refused"), "event bus connection failed: refused")]
    #[case(UserEventPublishError::delivery("nack"), "event delivery failed: nack")]
    #[case(UserEventPublishError::timeout(), "event publish timed out")]
    fn errors_render_messages(#[case] error: UserEventPublishError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[tokio::test]
    async fn fixture_publisher_accepts_events() {
        let publisher = FixtureUserEventPublisher;
        publisher
            .publish(&UserEvent::deleted(crate::domain::UserId::random()))
            .await
            .expect("fixture publish succeeds");
        publisher.ping().await.expect("fixture ping succeeds");
    }
}
