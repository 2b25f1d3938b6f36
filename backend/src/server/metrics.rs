//! Optional Prometheus metrics middleware wrapper.

use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use prometheus::Registry;

const METRICS_NAMESPACE: &str = "user_service";
const METRICS_ENDPOINT: &str = "/metrics";

/// Build the request metrics middleware over an explicit registry.
///
/// The middleware serves the exposition on `/metrics` and records a request
/// duration histogram labelled by endpoint pattern, method and status.
///
/// # Errors
/// Returns an I/O error when the collectors cannot be registered.
pub(crate) fn build_metrics(registry: Registry) -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new(METRICS_NAMESPACE)
        .registry(registry)
        .endpoint(METRICS_ENDPOINT)
        .build()
        .map_err(|err| std::io::Error::other(format!("metrics registration failed: {err}")))
}

#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        match metrics {
            Some(metrics) => Self::Enabled(Arc::new(metrics)),
            None => Self::Disabled,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            MetricsLayer::Enabled(metrics) => {
                let fut = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move {
                    let svc = fut.await?;
                    Ok(boxed::service(svc))
                })
            }
            MetricsLayer::Disabled => Box::pin(async move {
                let svc = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(svc))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    #[actix_web::test]
    async fn exposes_request_histogram_on_metrics_endpoint() {
        let metrics = build_metrics(Registry::new()).expect("collectors register");
        let app = test::init_service(
            App::new()
                .wrap(MetricsLayer::from_option(Some(metrics)))
                .route("/v1/users", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let _ = test::call_service(&app, test::TestRequest::get().uri("/v1/users").to_request())
            .await;
        let response =
            test::call_service(&app, test::TestRequest::get().uri(METRICS_ENDPOINT).to_request())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = test::read_body(response).await;
        let body = std::str::from_utf8(&body).expect("utf8 exposition");
        assert!(body.contains("user_service_http_requests_duration_seconds"));
        assert!(body.contains("endpoint=\"/v1/users\""));
    }

    #[actix_web::test]
    async fn disabled_layer_passes_requests_through() {
        let app = test::init_service(
            App::new()
                .wrap(MetricsLayer::from_option(None))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
