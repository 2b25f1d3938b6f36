//! Internal Diesel row structs for the users table.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{User, UserDetails, UserId, UserValidationError};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub password: String,
    pub email: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserValidationError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        User::new(
            UserId::from_uuid(row.id),
            UserDetails {
                first_name: row.first_name,
                last_name: row.last_name,
                nickname: row.nickname,
                password: row.password,
                email: row.email,
                country: row.country,
            },
            row.created_at,
            row.updated_at,
        )
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub nickname: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub country: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        let details = user.details();
        Self {
            id: *user.id().as_uuid(),
            first_name: &details.first_name,
            last_name: &details.last_name,
            nickname: &details.nickname,
            password: &details.password,
            email: &details.email,
            country: &details.country,
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Changeset applied by updates. `created_at` is deliberately absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub nickname: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub country: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a crate::domain::UserUpdate> for UserChangeset<'a> {
    fn from(update: &'a crate::domain::UserUpdate) -> Self {
        let details = &update.details;
        Self {
            first_name: &details.first_name,
            last_name: &details.last_name,
            nickname: &details.nickname,
            password: &details.password,
            email: &details.email,
            country: &details.country,
            updated_at: update.updated_at,
        }
    }
}
