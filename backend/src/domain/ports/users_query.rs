//! Driving port for user reads.

use async_trait::async_trait;

use crate::domain::{Error, ListUsersParams, User, UserId};

/// Domain use-case port for fetching and listing users.
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch one user.
    async fn get_user(&self, id: &UserId) -> Result<User, Error>;

    /// Parse raw list parameters and return the matching page.
    async fn list_users(&self, params: ListUsersParams) -> Result<Vec<User>, Error>;
}
