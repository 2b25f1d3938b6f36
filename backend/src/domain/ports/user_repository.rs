//! Driven port for user storage.
//!
//! The store must keep three write outcomes apart: the write happened, the
//! target does not exist, or the write happened but the post-write document
//! could not be read back. [`StoreWrite`] carries those signals so the write
//! orchestrator can branch on them without inspecting error text.

use async_trait::async_trait;

use crate::domain::{ListQuery, User, UserId, UserUpdate};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The operation did not finish within the configured deadline.
        Timeout { operation: String } => "user repository {operation} timed out",
    }
}

/// Outcome of a store mutation that targets an existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite<T> {
    /// The mutation was applied.
    Written(T),
    /// No record matched the identifier; nothing changed.
    NotFound,
    /// The mutation was applied but the stored document failed to decode.
    WrittenButUndecodable { reason: String },
}

/// Port for reading and writing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Return one page of users matching `query`.
    ///
    /// Descriptors built outside the parser may be rejected by the adapter;
    /// such rejections surface as [`UserPersistenceError::Query`].
    async fn list(&self, query: &ListQuery) -> Result<Vec<User>, UserPersistenceError>;

    /// Overwrite the editable fields and `updated_at`, returning the
    /// post-write document. `created_at` is never touched.
    async fn update(
        &self,
        update: &UserUpdate,
    ) -> Result<StoreWrite<User>, UserPersistenceError>;

    /// Remove a user.
    async fn delete(&self, id: &UserId) -> Result<StoreWrite<()>, UserPersistenceError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), UserPersistenceError>;

    /// Release pooled resources, waiting for checked-out connections.
    async fn close(&self) -> Result<(), UserPersistenceError>;
}
