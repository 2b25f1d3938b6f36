//! Redis pub/sub publisher backed by a `bb8-redis` pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis;

use crate::domain::UserEvent;
use crate::domain::ports::{UserEventPublishError, UserEventPublisher};

use super::encode_event;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Connection settings for [`RedisUserEventPublisher`].
#[derive(Debug, Clone)]
pub struct RedisPublisherConfig {
    url: String,
    channel: String,
    publish_timeout: Duration,
    max_size: u32,
}

impl RedisPublisherConfig {
    /// Create a configuration for `url` publishing on `channel`.
    ///
    /// Defaults: 3 second publish deadline, 4 pooled connections.
    pub fn new(url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel: channel.into(),
            publish_timeout: Duration::from_secs(3),
            max_size: 4,
        }
    }

    /// Set the deadline for a single publish or ping.
    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Set the maximum number of pooled connections.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Channel events are published on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn publish_timeout(&self) -> Duration {
        self.publish_timeout
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }
}

/// Publishes events with `PUBLISH <channel> <json>`.
#[derive(Clone)]
pub struct RedisUserEventPublisher {
    pool: Pool<RedisConnectionManager>,
    channel: String,
    publish_timeout: Duration,
}

impl RedisUserEventPublisher {
    /// Build the connection pool.
    ///
    /// # Errors
    /// Returns [`UserEventPublishError::Connection`] when the URL is invalid
    /// or the pool cannot be built.
    pub async fn connect(config: RedisPublisherConfig) -> Result<Self, UserEventPublishError> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(|err| UserEventPublishError::connection(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.publish_timeout)
            .build(manager)
            .await
            .map_err(|err| UserEventPublishError::connection(err.to_string()))?;
        Ok(Self {
            pool,
            channel: config.channel,
            publish_timeout: config.publish_timeout,
        })
    }

    async fn run<T>(&self, command: redis::Cmd) -> Result<T, UserEventPublishError>
    where
        T: redis::FromRedisValue,
    {
        let work = async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| UserEventPublishError::connection(err.to_string()))?;
            command
                .query_async::<T>(&mut *conn)
                .await
                .map_err(|err| UserEventPublishError::delivery(err.to_string()))
        };
        tokio::time::timeout(self.publish_timeout, work)
            .await
            .map_err(|_| UserEventPublishError::timeout())?
    }
}

#[async_trait]
impl UserEventPublisher for RedisUserEventPublisher {
    async fn publish(&self, event: &UserEvent) -> Result<(), UserEventPublishError> {
        let payload = encode_event(event)?;
        let mut command = redis::cmd("PUBLISH");
        command.arg(&self.channel).arg(payload);
        let _receivers: i64 = self.run(command).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), UserEventPublishError> {
        let reply: String = self.run(redis::cmd("PING")).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(UserEventPublishError::connection(format!(
                "unexpected PING reply: {reply}"
            )))
        }
    }

    async fn close(&self) -> Result<(), UserEventPublishError> {
        loop {
            let state = self.pool.state();
            if state.connections <= state.idle_connections {
                return Ok(());
            }
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn config_defaults() {
        let config = RedisPublisherConfig::new("redis://localhost:6379", "UserEvents");
        assert_eq!(config.channel(), "UserEvents");
        assert_eq!(config.publish_timeout, Duration::from_secs(3));
        assert_eq!(config.max_size, 4);
    }

    #[rstest]
    fn config_overrides() {
        let config = RedisPublisherConfig::new("redis://localhost:6379", "UserEvents")
            .with_publish_timeout(Duration::from_millis(250))
            .with_max_size(8);
        assert_eq!(config.publish_timeout, Duration::from_millis(250));
        assert_eq!(config.max_size, 8);
    }

    #[tokio::test]
    async fn connect_rejects_invalid_url() {
        let config = RedisPublisherConfig::new("not a redis url", "UserEvents");
        let err = RedisUserEventPublisher::connect(config)
            .await
            .err()
            .expect("invalid url");
        assert!(matches!(err, UserEventPublishError::Connection { .. }));
    }
}
