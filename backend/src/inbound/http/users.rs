//! Users API handlers.
//!
//! ```text
//! POST   /v1/users        {"first_name":"Ada",...}
//! GET    /v1/users/{id}
//! PUT    /v1/users/{id}   {"first_name":"Ada",...}
//! DELETE /v1/users/{id}
//! GET    /v1/users?pageSize=10&page=0&sortBy=nickname.desc&country=UK
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{
    ApiResult, Error, ListUsersParams, User, UserDetails, UserId, validate_user_details,
};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::state::HttpState;

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::parse(raw).map_err(|err| Error::invalid_request(format!("incorrect user ID format: {err}")))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = UserDetails,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserDetails>,
) -> ApiResult<HttpResponse> {
    let user = state.users.create_user(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users_query.get_user(&id).await?;
    Ok(web::Json(user))
}

/// Replace the editable fields of a user.
///
/// The body is validated before the path id is parsed, so a request that is
/// wrong in both places reports the body error.
#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    request_body = UserDetails,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UserDetails>,
) -> ApiResult<HttpResponse> {
    let details = payload.into_inner();
    validate_user_details(&details).map_err(|err| Error::invalid_request(err.to_string()))?;
    let id = parse_user_id(&path)?;
    state.users.update_user(&id, details).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users.delete_user(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List users with filtering, sorting and pagination.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_service::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/v1/users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    params: web::Query<ListUsersParams>,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users_query.list_users(params.into_inner()).await?;
    Ok(web::Json(users))
}

/// Register the user routes on a `/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_user)
        .service(list_users)
        .service(get_user)
        .service(update_user)
        .service(delete_user);
}
