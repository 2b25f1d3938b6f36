//! List-query descriptor and the query-parameter parser that produces it.
//!
//! Raw query parameters arrive as optional strings. [`ListQuery::parse`]
//! validates them in a fixed order (`pageSize`, `page`, `sortBy`) and stops at
//! the first failure. Filter values cannot fail and are copied verbatim.

use serde::Deserialize;
use thiserror::Error;
use utoipa::IntoParams;

/// Page size used when the client omits `pageSize`.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Page index used when the client omits `page`.
pub const DEFAULT_PAGE: i64 = 0;
/// Sort field used when the client omits `sortBy`.
pub const DEFAULT_SORT_FIELD: &str = "last_name";

/// Fields a list can be ordered by.
pub const SORTABLE_FIELDS: [&str; 8] = [
    "first_name",
    "last_name",
    "nickname",
    "password",
    "email",
    "country",
    "created_at",
    "updated_at",
];

/// Raw list parameters as received on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersParams {
    /// Number of users per page (default 20, `0` means no limit).
    #[serde(rename = "pageSize")]
    #[param(example = "20")]
    pub page_size: Option<String>,
    /// Zero-based page index (default 0).
    #[param(example = "0")]
    pub page: Option<String>,
    /// `<field>.<asc|desc>`, e.g. `nickname.desc`.
    #[serde(rename = "sortBy")]
    #[param(example = "last_name.asc")]
    pub sort_by: Option<String>,
    /// Exact-match first name.
    pub first_name: Option<String>,
    /// Exact-match last name.
    pub last_name: Option<String>,
    /// Exact-match nickname.
    pub nickname: Option<String>,
    /// Exact-match email.
    pub email: Option<String>,
    /// Exact-match country.
    pub country: Option<String>,
}

/// Reasons a set of list parameters is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListQueryError {
    #[error("pageSize query parameter has to be a number")]
    PageSizeNotNumber,
    #[error("pageSize query parameter has to be a positive number")]
    PageSizeNegative,
    #[error("page query parameter has to be a number")]
    PageNotNumber,
    #[error("page query parameter has to be a positive number")]
    PageNegative,
    #[error("invalid sortBy query parameter format")]
    SortFormat,
    #[error("unsupported sorting field")]
    SortField,
    #[error("invalid sorting type")]
    SortDirection,
}

/// Sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// One of [`SORTABLE_FIELDS`] once parsed.
    pub field: String,
    /// `asc` or `desc` once parsed.
    pub direction: String,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: DEFAULT_SORT_FIELD.to_owned(),
            direction: "asc".to_owned(),
        }
    }
}

/// Exact-match constraints. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
}

/// Validated list request.
///
/// Fields are public so callers can build descriptors directly; the storage
/// query builder re-checks the invariants it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_size: i64,
    pub page: i64,
    pub sort: SortSpec,
    pub filter: UserFilter,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page: DEFAULT_PAGE,
            sort: SortSpec::default(),
            filter: UserFilter::default(),
        }
    }
}

impl ListQuery {
    /// Parse raw query parameters.
    ///
    /// # Errors
    /// Returns the first failing check in the order `pageSize`, `page`,
    /// `sortBy`.
    ///
    /// # Examples
    /// ```
    /// use user_service::domain::{ListQuery, ListUsersParams};
    ///
    /// let params = ListUsersParams {
    ///     sort_by: Some("Nickname.DESC".into()),
    ///     ..ListUsersParams::default()
    /// };
    /// let query = ListQuery::parse(params).expect("valid parameters");
    /// assert_eq!(query.sort.field, "nickname");
    /// assert_eq!(query.sort.direction, "desc");
    /// ```
    pub fn parse(params: ListUsersParams) -> Result<Self, ListQueryError> {
        let page_size = parse_non_negative(
            params.page_size.as_deref(),
            DEFAULT_PAGE_SIZE,
            ListQueryError::PageSizeNotNumber,
            ListQueryError::PageSizeNegative,
        )?;
        let page = parse_non_negative(
            params.page.as_deref(),
            DEFAULT_PAGE,
            ListQueryError::PageNotNumber,
            ListQueryError::PageNegative,
        )?;
        let sort = match params.sort_by.as_deref() {
            Some(raw) => parse_sort(raw)?,
            None => SortSpec::default(),
        };

        Ok(Self {
            page_size,
            page,
            sort,
            filter: UserFilter {
                first_name: params.first_name,
                last_name: params.last_name,
                nickname: params.nickname,
                email: params.email,
                country: params.country,
            },
        })
    }
}

fn parse_non_negative(
    raw: Option<&str>,
    default: i64,
    not_number: ListQueryError,
    negative: ListQueryError,
) -> Result<i64, ListQueryError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: i64 = raw.parse().map_err(|_| not_number)?;
    if value < 0 {
        return Err(negative);
    }
    Ok(value)
}

fn parse_sort(raw: &str) -> Result<SortSpec, ListQueryError> {
    let lowered = raw.to_lowercase();
    let mut segments = lowered.split('.');
    let (Some(field), Some(direction), None) = (segments.next(), segments.next(), segments.next())
    else {
        return Err(ListQueryError::SortFormat);
    };
    if !SORTABLE_FIELDS.contains(&field) {
        return Err(ListQueryError::SortField);
    }
    if direction != "asc" && direction != "desc" {
        return Err(ListQueryError::SortDirection);
    }
    Ok(SortSpec {
        field: field.to_owned(),
        direction: direction.to_owned(),
    })
}
