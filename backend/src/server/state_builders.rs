//! Builders selecting store and publisher adapters from settings.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use user_service::domain::ports::{
    UserEventPublishError, UserEventPublisher, UserPersistenceError, UserRepository,
};
use user_service::outbound::events::{
    LogUserEventPublisher, RedisPublisherConfig, RedisUserEventPublisher,
};
use user_service::outbound::persistence::{
    DbPool, DieselUserRepository, InMemoryUserRepository, PoolConfig, PoolError,
    apply_migrations,
};

use super::ServiceSettings;

/// Failures while wiring adapters at startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database migrations failed: {0}")]
    Migrations(#[from] UserPersistenceError),
    #[error("migration task failed: {0}")]
    MigrationTask(#[from] tokio::task::JoinError),
    #[error("database pool unavailable: {0}")]
    Pool(#[from] PoolError),
    #[error("event publisher unavailable: {0}")]
    Publisher(#[from] UserEventPublishError),
}

impl From<BootstrapError> for std::io::Error {
    fn from(err: BootstrapError) -> Self {
        std::io::Error::other(err)
    }
}

/// Build the user store.
///
/// Applies the embedded migrations and connects a pool when a database URL
/// is configured; otherwise falls back to the in-memory document store.
pub async fn build_store(
    settings: &ServiceSettings,
) -> Result<Arc<dyn UserRepository>, BootstrapError> {
    let Some(database_url) = settings.database_url.clone() else {
        warn!("no database configured; using in-memory user store");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    };

    let migrations_url = database_url.clone();
    tokio::task::spawn_blocking(move || apply_migrations(&migrations_url)).await??;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_connection_timeout(settings.store_operation_timeout()),
    )
    .await?;
    info!("connected to PostgreSQL user store");
    Ok(Arc::new(DieselUserRepository::new(
        pool,
        settings.store_operation_timeout(),
    )))
}

fn redis_publisher_config(
    settings: &ServiceSettings,
    redis_url: String,
    channel: String,
) -> RedisPublisherConfig {
    RedisPublisherConfig::new(redis_url, channel)
        .with_publish_timeout(settings.publish_timeout())
        .with_max_size(settings.publisher_pool_size)
}

/// Build the event publisher.
///
/// Connects to Redis when a URL is configured; otherwise events are only
/// logged.
pub async fn build_publisher(
    settings: &ServiceSettings,
) -> Result<Arc<dyn UserEventPublisher>, BootstrapError> {
    let channel = settings.events_channel().to_owned();
    let Some(redis_url) = settings.redis_url.clone() else {
        warn!(%channel, "no redis configured; user events will only be logged");
        return Ok(Arc::new(LogUserEventPublisher::new(channel)));
    };

    let config = redis_publisher_config(settings, redis_url, channel);
    let publisher = RedisUserEventPublisher::connect(config).await?;
    info!(channel = settings.events_channel(), "connected to redis event bus");
    Ok(Arc::new(publisher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::time::Duration;

    use ortho_config::OrthoConfig;
    use rstest::rstest;
    use user_service::domain::{ListQuery, UserEvent, UserId};

    fn settings() -> ServiceSettings {
        let mut settings = ServiceSettings::load_from_iter([OsString::from("user-service")])
            .expect("config should load");
        settings.database_url = None;
        settings.redis_url = None;
        settings
    }

    #[rstest]
    #[tokio::test]
    async fn unset_database_selects_in_memory_store() {
        let store = build_store(&settings()).await.expect("store builds");
        store.ping().await.expect("in-memory store answers");
        let users = store.list(&ListQuery::default()).await.expect("list");
        assert!(users.is_empty());
    }

    #[rstest]
    fn redis_config_follows_settings() {
        let mut settings = settings();
        settings.publish_timeout_ms = 750;
        settings.publisher_pool_size = 12;
        let config = redis_publisher_config(
            &settings,
            "redis://localhost:6379".to_owned(),
            "Audit".to_owned(),
        );
        assert_eq!(config.channel(), "Audit");
        assert_eq!(config.publish_timeout(), Duration::from_millis(750));
        assert_eq!(config.max_size(), 12);
    }

    #[rstest]
    #[tokio::test]
    async fn unset_redis_selects_log_publisher() {
        let publisher = build_publisher(&settings()).await.expect("publisher builds");
        publisher
            .publish(&UserEvent::deleted(UserId::random()))
            .await
            .expect("log publisher accepts events");
    }
}
