//! Health endpoints: liveness and readiness probes for orchestration and
//! load balancers.
//!
//! Readiness pings the user store and the event publisher on every probe and
//! reports failing checks by name.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{UserEventPublisher, UserRepository};

const STORE_CHECK: &str = "store";
const PUBLISHER_CHECK: &str = "publisher";

/// Overall readiness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ReadinessStatus {
    #[serde(rename = "OK")]
    Ok,
    Unavailable,
}

/// Name and version of the running service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ComponentInfo {
    pub name: String,
    pub version: String,
}

/// Body returned by `GET /health/ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReadinessReport {
    pub status: ReadinessStatus,
    pub component: ComponentInfo,
    /// Failing checks keyed by name.
    pub failures: BTreeMap<String, String>,
}

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    component: ComponentInfo,
    store: Arc<dyn UserRepository>,
    publisher: Arc<dyn UserEventPublisher>,
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new(
        component: ComponentInfo,
        store: Arc<dyn UserRepository>,
        publisher: Arc<dyn UserEventPublisher>,
    ) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            component,
            store,
            publisher,
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, liveness probes emit 503 to trigger restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Run the dependency checks and build a readiness report.
    pub async fn readiness(&self) -> ReadinessReport {
        let mut failures = BTreeMap::new();
        if !self.is_ready() {
            failures.insert("startup".to_owned(), "service is starting".to_owned());
        }

        let (store, publisher) = tokio::join!(self.store.ping(), self.publisher.ping());
        if let Err(err) = store {
            failures.insert(STORE_CHECK.to_owned(), err.to_string());
        }
        if let Err(err) = publisher {
            failures.insert(PUBLISHER_CHECK.to_owned(), err.to_string());
        }

        let status = if failures.is_empty() {
            ReadinessStatus::Ok
        } else {
            ReadinessStatus::Unavailable
        };
        ReadinessReport {
            status,
            component: self.component.clone(),
            failures,
        }
    }
}

fn probe_response(probe_ok: bool) -> actix_web::HttpResponseBuilder {
    let mut response = if probe_ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response.insert_header((header::CACHE_CONTROL, "no-store"));
    response
}

/// Readiness probe. Return 200 when the server is ready and its dependencies
/// answer; return 503 with the failing checks otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic", body = ReadinessReport),
        (status = 503, description = "Server is not ready", body = ReadinessReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let report = state.readiness().await;
    probe_response(report.status == ReadinessStatus::Ok).json(report)
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once draining.
/// Call `HealthState::mark_unhealthy` before graceful shutdown to surface the drain early.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_alive()).finish()
}
