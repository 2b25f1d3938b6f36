//! User service entry-point: loads settings, wires adapters and serves the
//! REST API until a shutdown signal arrives.

mod server;

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ortho_config::OrthoConfig;
use server::{ServerConfig, ServiceSettings, build_publisher, build_store, create_server};
use user_service::domain::UsersService;
use user_service::domain::ports::{UserEventPublisher, UserRepository};
use user_service::inbound::http::health::{ComponentInfo, HealthState};
use user_service::inbound::http::state::HttpState;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;

    let store = build_store(&settings).await?;
    let publisher = build_publisher(&settings).await?;

    let service = UsersService::new(
        Arc::clone(&store),
        Arc::clone(&publisher),
        Arc::new(DefaultClock),
    );
    let http_state = web::Data::new(HttpState::from_service(Arc::new(service)));
    let health_state = web::Data::new(HealthState::new(
        ComponentInfo {
            name: settings.service_name().to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        },
        Arc::clone(&store),
        Arc::clone(&publisher),
    ));

    let config = ServerConfig::from_settings(&settings);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::build_metrics(prometheus::Registry::new())?));

    let server = create_server(health_state.clone(), http_state, config)?;
    let handle = server.handle();
    let mut server_task = actix_web::rt::spawn(server);
    health_state.mark_ready();
    info!(addr = %settings.bind_addr(), "user service listening");

    let served = tokio::select! {
        result = &mut server_task => Some(result),
        () = shutdown_signal() => None,
    };

    let served = match served {
        Some(result) => result,
        None => {
            info!("shutdown signal received; draining requests");
            health_state.mark_unhealthy();
            handle.stop(true).await;
            server_task.await
        }
    };

    close_adapters(store, publisher, &settings).await;

    match served {
        Ok(result) => result,
        Err(err) => Err(std::io::Error::other(format!("server task failed: {err}"))),
    }
}

/// Close the store and publisher concurrently, each within its grace period.
async fn close_adapters(
    store: Arc<dyn UserRepository>,
    publisher: Arc<dyn UserEventPublisher>,
    settings: &ServiceSettings,
) {
    let (store_closed, publisher_closed) = tokio::join!(
        within(settings.store_shutdown_grace(), store.close()),
        within(settings.publisher_shutdown_grace(), publisher.close()),
    );

    match store_closed {
        Some(Ok(())) => info!("user store closed"),
        Some(Err(err)) => error!(error = %err, "user store failed to close"),
        None => warn!("user store did not close within its grace period"),
    }
    match publisher_closed {
        Some(Ok(())) => info!("event publisher closed"),
        Some(Err(err)) => error!(error = %err, "event publisher failed to close"),
        None => warn!("event publisher did not close within its grace period"),
    }
}

async fn within<F: std::future::Future>(grace: Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(grace, fut).await.ok()
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
}
