//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::UserEvent;
use crate::domain::ports::{UserEventPublishError, UserEventPublisher};

/// Publisher that keeps every event it is handed.
///
/// # Examples
/// ```
/// use user_service::domain::ports::UserEventPublisher;
/// use user_service::domain::{UserEvent, UserId};
/// use user_service::test_support::RecordingUserEventPublisher;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let publisher = RecordingUserEventPublisher::default();
/// publisher.publish(&UserEvent::deleted(UserId::random())).await.unwrap();
/// assert_eq!(publisher.events().len(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct RecordingUserEventPublisher {
    events: Mutex<Vec<UserEvent>>,
}

impl RecordingUserEventPublisher {
    /// Events published so far, oldest first.
    pub fn events(&self) -> Vec<UserEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserEventPublisher for RecordingUserEventPublisher {
    async fn publish(&self, event: &UserEvent) -> Result<(), UserEventPublishError> {
        self.events
            .lock()
            .map_err(|_| UserEventPublishError::delivery("recording publisher poisoned"))?
            .push(event.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), UserEventPublishError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), UserEventPublishError> {
        Ok(())
    }
}

/// Publisher whose every call fails with a delivery error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingUserEventPublisher;

#[async_trait]
impl UserEventPublisher for FailingUserEventPublisher {
    async fn publish(&self, _event: &UserEvent) -> Result<(), UserEventPublishError> {
        Err(UserEventPublishError::delivery("bus unavailable"))
    }

    async fn ping(&self) -> Result<(), UserEventPublishError> {
        Err(UserEventPublishError::connection("bus unavailable"))
    }

    async fn close(&self) -> Result<(), UserEventPublishError> {
        Ok(())
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
