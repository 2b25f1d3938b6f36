//! Service settings and HTTP server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_EVENTS_CHANNEL: &str = "UserEvents";
const DEFAULT_SERVICE_NAME: &str = "user-service";

/// Settings loaded from CLI flags, `USER_SERVICE_*` environment variables
/// and configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_SERVICE")]
pub struct ServiceSettings {
    /// Port the HTTP listener binds on all interfaces.
    #[ortho_config(default = 8080)]
    pub http_port: u16,
    /// Time allowed for in-flight requests to finish on shutdown.
    #[ortho_config(default = 5000)]
    pub http_shutdown_grace_ms: u64,
    /// Time allowed for the store to close on shutdown.
    #[ortho_config(default = 5000)]
    pub store_shutdown_grace_ms: u64,
    /// Time allowed for the publisher to close on shutdown.
    #[ortho_config(default = 5000)]
    pub publisher_shutdown_grace_ms: u64,
    /// Deadline for each store operation.
    #[ortho_config(default = 3000)]
    pub store_operation_timeout_ms: u64,
    /// Deadline for each publish.
    #[ortho_config(default = 3000)]
    pub publish_timeout_ms: u64,
    /// Maximum pooled Redis connections held by the publisher.
    #[ortho_config(default = 4)]
    pub publisher_pool_size: u32,
    /// PostgreSQL URL. Unset selects the in-memory store.
    pub database_url: Option<String>,
    /// Redis URL. Unset selects the log-only publisher.
    pub redis_url: Option<String>,
    /// Pub/sub channel events are published on.
    pub events_channel: Option<String>,
    /// Component name reported by the readiness probe.
    pub service_name: Option<String>,
}

impl ServiceSettings {
    /// Socket address of the HTTP listener.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.http_port))
    }

    /// Channel name, falling back to `UserEvents`.
    pub fn events_channel(&self) -> &str {
        self.events_channel
            .as_deref()
            .unwrap_or(DEFAULT_EVENTS_CHANNEL)
    }

    /// Service name, falling back to `user-service`.
    pub fn service_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or(DEFAULT_SERVICE_NAME)
    }

    pub fn http_shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.http_shutdown_grace_ms)
    }

    pub fn store_shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.store_shutdown_grace_ms)
    }

    pub fn publisher_shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.publisher_shutdown_grace_ms)
    }

    pub fn store_operation_timeout(&self) -> Duration {
        Duration::from_millis(self.store_operation_timeout_ms)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) shutdown_grace: Duration,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &ServiceSettings) -> Self {
        Self {
            bind_addr: settings.bind_addr(),
            shutdown_grace: settings.http_shutdown_grace(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
