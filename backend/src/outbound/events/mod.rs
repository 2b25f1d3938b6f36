//! Event publisher adapters.
//!
//! - [`RedisUserEventPublisher`] publishes JSON envelopes on a Redis pub/sub
//!   channel through a `bb8-redis` pool.
//! - [`LogUserEventPublisher`] writes events to the log only. It is wired in
//!   when no bus is configured.

mod log_publisher;
mod redis_publisher;

pub use log_publisher::LogUserEventPublisher;
pub use redis_publisher::{RedisPublisherConfig, RedisUserEventPublisher};

use crate::domain::UserEvent;
use crate::domain::ports::UserEventPublishError;

/// Encode an event as the JSON envelope consumers read.
pub(crate) fn encode_event(event: &UserEvent) -> Result<String, UserEventPublishError> {
    serde_json::to_string(event).map_err(|err| UserEventPublishError::serialization(err.to_string()))
}
