//! Embedded schema migrations for the PostgreSQL user store.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::ports::UserPersistenceError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply all pending migrations.
///
/// Uses a synchronous connection; call it from a blocking context.
///
/// # Errors
/// Returns a connection error when the database is unreachable and a query
/// error when a migration fails.
pub fn apply_migrations(database_url: &str) -> Result<(), UserPersistenceError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| UserPersistenceError::connection(err.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| UserPersistenceError::query(format!("migration: {err}")))?;
    Ok(())
}
