//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer (users,
//! health) and the schemas they reference. The generated document backs
//! Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{User, UserDetails};
use crate::inbound::http::ErrorBody;
use crate::inbound::http::health::{ComponentInfo, ReadinessReport, ReadinessStatus};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User service API",
        description = "CRUD interface for users, with readiness and liveness probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        UserDetails,
        ErrorBody,
        ReadinessReport,
        ReadinessStatus,
        ComponentInfo
    )),
    tags(
        (name = "users", description = "Operations related to users"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
