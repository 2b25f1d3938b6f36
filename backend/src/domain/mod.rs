//! Domain primitives, use cases and ports.
//!
//! Purpose: define the user model, its validation rules, the list-query
//! descriptor and the write orchestration that sits between inbound adapters
//! and the driven store and publisher ports.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic failure reported by use cases.
//! - User / UserDetails / UserId — the user aggregate and its parts.
//! - ListQuery / ListUsersParams — list descriptor and its raw input.
//! - UserEvent — mutation notification handed to the publisher.
//! - UsersService — implementation of the driving ports.

pub mod error;
pub mod list_query;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_events;
pub mod users_service;
pub mod validation;

pub use self::error::{Error, ErrorCode};
pub use self::list_query::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT_FIELD, ListQuery, ListQueryError,
    ListUsersParams, SORTABLE_FIELDS, SortSpec, UserFilter,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{User, UserDetails, UserId, UserUpdate, truncate_to_millis};
pub use self::user_events::{DeletedUser, UserEvent};
pub use self::users_service::UsersService;
pub use self::validation::{UserValidationError, is_valid_mailbox, validate_user_details};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use user_service::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("user not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
