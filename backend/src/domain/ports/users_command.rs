//! Driving port for user mutations.
//!
//! Inbound adapters call this port with validated identifiers and raw field
//! values; the implementation owns validation, timestamps and notification.

use async_trait::async_trait;

use crate::domain::{Error, User, UserDetails, UserId};

/// Domain use-case port for creating, updating and deleting users.
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create a user and return the stored record.
    async fn create_user(&self, details: UserDetails) -> Result<User, Error>;

    /// Replace the editable fields of an existing user.
    async fn update_user(&self, id: &UserId, details: UserDetails) -> Result<(), Error>;

    /// Delete an existing user.
    async fn delete_user(&self, id: &UserId) -> Result<(), Error>;
}
