//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: user stores (in-memory documents, PostgreSQL via Diesel)
//! - **events**: user event publishers (Redis pub/sub, log-only)
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod events;
pub mod persistence;
