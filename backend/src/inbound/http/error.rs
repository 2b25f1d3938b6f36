//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into `{"error": "<message>"}` bodies and
//! status codes. Extractor failures (malformed JSON, query strings or path
//! segments) are routed through the same type.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// JSON body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Client-facing message.
    #[schema(example = "user not found")]
    pub error: String,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(ErrorBody {
            error: self.message().to_owned(),
        })
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(err.to_string()).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(err.to_string()).into()
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(err.to_string()).into()
}

/// Extractor configuration that reports binding failures as 400 responses
/// with the standard error body.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));
}

#[cfg(test)]
mod tests {
    //! Status and body mapping coverage.
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), status);
    }

    #[rstest]
    #[actix_web::test]
    async fn error_response_carries_message_and_trace_id() {
        let error = Error::not_found("user not found").with_trace_id(TRACE_ID);
        let response = ResponseError::error_response(&error);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace-id header is set by error_response")
            .to_str()
            .expect("trace-id is valid UTF-8")
            .to_owned();
        assert_eq!(header, TRACE_ID);

        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");
        let body: ErrorBody = serde_json::from_slice(&bytes).expect("error body");
        assert_eq!(
            body,
            ErrorBody {
                error: "user not found".into()
            }
        );
    }

    #[rstest]
    fn error_response_omits_trace_id_when_absent() {
        let response = ResponseError::error_response(&Error::invalid_request("bad"));
        assert!(response.headers().get(TRACE_ID_HEADER).is_none());
    }

    #[rstest]
    fn actix_errors_become_opaque_internal_errors() {
        let actix_error = actix_web::error::ErrorBadGateway("upstream detail");
        let error = Error::from(actix_error);
        assert_eq!(error.code(), ErrorCode::InternalError);
        assert_eq!(error.message(), "Internal server error");
    }
}
