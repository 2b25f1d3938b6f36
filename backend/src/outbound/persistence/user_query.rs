//! Translation of a [`ListQuery`] into store-level list options.
//!
//! The descriptor may have been built without going through the parser, so
//! the builder re-checks the invariants it relies on. Both store adapters
//! consume the resulting [`UserListQuery`].

use thiserror::Error;

use crate::domain::ListQuery;

/// Reasons a descriptor cannot be turned into store options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UserQueryError {
    #[error("sort field is required")]
    SortFieldRequired,
    #[error("unsupported sorting field")]
    UnsupportedSortField,
    #[error("page size cannot be negative number")]
    NegativePageSize,
    #[error("page cannot be negative number")]
    NegativePage,
}

/// Columns that accept exact-match filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    FirstName,
    LastName,
    Nickname,
    Email,
    Country,
}

impl FilterField {
    /// Stored field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Nickname => "nickname",
            Self::Email => "email",
            Self::Country => "country",
        }
    }
}

/// Columns a list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    FirstName,
    LastName,
    Nickname,
    Password,
    Email,
    Country,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Resolve a stored field name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "first_name" => Self::FirstName,
            "last_name" => Self::LastName,
            "nickname" => Self::Nickname,
            "password" => Self::Password,
            "email" => Self::Email,
            "country" => Self::Country,
            "created_at" => Self::CreatedAt,
            "updated_at" => Self::UpdatedAt,
            _ => return None,
        };
        Some(field)
    }

    /// Stored field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Nickname => "nickname",
            Self::Password => "password",
            Self::Email => "email",
            Self::Country => "country",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Store-level list options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    /// Equality clauses, one per non-empty filter value.
    pub filters: Vec<(FilterField, String)>,
    pub sort_field: SortField,
    pub order: SortOrder,
    /// Records to skip, `page * page_size`.
    pub skip: u64,
    /// Maximum records to return; `None` leaves the store default in place.
    pub limit: Option<u64>,
}

impl UserListQuery {
    /// Build store options from a descriptor.
    ///
    /// # Errors
    /// Returns [`UserQueryError`] when the sort field is empty or unknown or
    /// when the page or page size is negative.
    ///
    /// # Examples
    /// ```
    /// use user_service::domain::ListQuery;
    /// use user_service::outbound::persistence::{SortOrder, UserListQuery};
    ///
    /// let mut query = ListQuery::default();
    /// query.page = 3;
    /// query.sort.direction = "desc".into();
    /// let options = UserListQuery::build(&query).expect("valid descriptor");
    /// assert_eq!(options.skip, 60);
    /// assert_eq!(options.limit, Some(20));
    /// assert_eq!(options.order, SortOrder::Descending);
    /// ```
    pub fn build(query: &ListQuery) -> Result<Self, UserQueryError> {
        if query.sort.field.is_empty() {
            return Err(UserQueryError::SortFieldRequired);
        }
        if query.page_size < 0 {
            return Err(UserQueryError::NegativePageSize);
        }
        if query.page < 0 {
            return Err(UserQueryError::NegativePage);
        }
        let sort_field =
            SortField::from_name(&query.sort.field).ok_or(UserQueryError::UnsupportedSortField)?;

        let order = if query.sort.direction == "desc" {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        let page_size = query.page_size.unsigned_abs();
        let skip = query.page.unsigned_abs().saturating_mul(page_size);
        let limit = (page_size > 0).then_some(page_size);

        Ok(Self {
            filters: filters(query),
            sort_field,
            order,
            skip,
            limit,
        })
    }
}

fn filters(query: &ListQuery) -> Vec<(FilterField, String)> {
    let filter = &query.filter;
    [
        (FilterField::FirstName, &filter.first_name),
        (FilterField::LastName, &filter.last_name),
        (FilterField::Nickname, &filter.nickname),
        (FilterField::Email, &filter.email),
        (FilterField::Country, &filter.country),
    ]
    .into_iter()
    .filter_map(|(field, value)| {
        value
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(|value| (field, value.to_owned()))
    })
    .collect()
}
