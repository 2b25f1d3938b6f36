//! User store adapters.
//!
//! Two implementations of the `UserRepository` port live here:
//!
//! - [`InMemoryUserRepository`] keeps JSON documents in process memory.
//! - [`DieselUserRepository`] persists to PostgreSQL via Diesel with async
//!   support through `diesel-async` and `bb8` connection pooling.
//!
//! Both translate list descriptors through [`UserListQuery`]. Diesel row
//! structs (`models.rs`) and schema definitions (`schema.rs`) are internal
//! and never exposed to the domain.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use user_service::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
//! let repo = DieselUserRepository::new(pool, Duration::from_secs(3));
//! ```

mod diesel_user_repository;
mod in_memory_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;
mod user_query;

pub use diesel_user_repository::DieselUserRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use migrations::apply_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use user_query::{FilterField, SortField, SortOrder, UserListQuery, UserQueryError};
