//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersCommand>,
    pub users_query: Arc<dyn UsersQuery>,
}

impl HttpState {
    /// Construct state from the driving ports.
    pub fn new(users: Arc<dyn UsersCommand>, users_query: Arc<dyn UsersQuery>) -> Self {
        Self { users, users_query }
    }

    /// Construct state from one service implementing both ports.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: UsersCommand + UsersQuery + 'static,
    {
        let users: Arc<dyn UsersCommand> = service.clone();
        let users_query: Arc<dyn UsersQuery> = service;
        Self { users, users_query }
    }
}
