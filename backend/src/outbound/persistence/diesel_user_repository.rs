//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Every operation runs under the configured store deadline; a call that
//! overruns it fails with [`UserPersistenceError::Timeout`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{StoreWrite, UserPersistenceError, UserRepository};
use crate::domain::{ListQuery, User, UserId, UserUpdate};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use super::user_query::{FilterField, SortField, SortOrder, UserListQuery};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    operation_timeout: Duration,
}

impl DieselUserRepository {
    /// Create a new repository over `pool`, bounding each call by
    /// `operation_timeout`.
    pub fn new(pool: DbPool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        work: F,
    ) -> Result<T, UserPersistenceError>
    where
        F: Future<Output = Result<T, UserPersistenceError>>,
    {
        tokio::time::timeout(self.operation_timeout, work)
            .await
            .map_err(|_| UserPersistenceError::timeout(operation))?
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserPersistenceError::query("duplicate user id")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = row.id;
    User::try_from(row)
        .map_err(|err| UserPersistenceError::query(format!("stored user {id} is invalid: {err}")))
}

fn offset_of(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Apply the sort column and direction, with the id as a stable tie-breaker.
macro_rules! ordered {
    ($statement:expr, $order:expr, $column:expr) => {
        match $order {
            SortOrder::Ascending => $statement.order(($column.asc(), users::id.asc())),
            SortOrder::Descending => $statement.order(($column.desc(), users::id.asc())),
        }
    };
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.bounded("create", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::insert_into(users::table)
                .values(NewUserRow::from(user))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.bounded("find", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = users::table
                .find(*id.as_uuid())
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<User>, UserPersistenceError> {
        let options = UserListQuery::build(query)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;

        self.bounded("list", async {
            let mut statement = users::table.select(UserRow::as_select()).into_boxed();
            for (field, value) in &options.filters {
                let value = value.as_str();
                statement = match field {
                    FilterField::FirstName => statement.filter(users::first_name.eq(value)),
                    FilterField::LastName => statement.filter(users::last_name.eq(value)),
                    FilterField::Nickname => statement.filter(users::nickname.eq(value)),
                    FilterField::Email => statement.filter(users::email.eq(value)),
                    FilterField::Country => statement.filter(users::country.eq(value)),
                };
            }
            statement = match options.sort_field {
                SortField::FirstName => ordered!(statement, options.order, users::first_name),
                SortField::LastName => ordered!(statement, options.order, users::last_name),
                SortField::Nickname => ordered!(statement, options.order, users::nickname),
                SortField::Password => ordered!(statement, options.order, users::password),
                SortField::Email => ordered!(statement, options.order, users::email),
                SortField::Country => ordered!(statement, options.order, users::country),
                SortField::CreatedAt => ordered!(statement, options.order, users::created_at),
                SortField::UpdatedAt => ordered!(statement, options.order, users::updated_at),
            };
            statement = statement.offset(offset_of(options.skip));
            if let Some(limit) = options.limit {
                statement = statement.limit(offset_of(limit));
            }

            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let rows: Vec<UserRow> = statement
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }

    async fn update(
        &self,
        update: &UserUpdate,
    ) -> Result<StoreWrite<User>, UserPersistenceError> {
        self.bounded("update", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = diesel::update(users::table.find(*update.id.as_uuid()))
                .set(UserChangeset::from(update))
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

            let Some(row) = row else {
                return Ok(StoreWrite::NotFound);
            };
            Ok(match User::try_from(row) {
                Ok(user) => StoreWrite::Written(user),
                Err(err) => {
                    warn!(user_id = %update.id, error = %err, "updated row failed to decode");
                    StoreWrite::WrittenButUndecodable {
                        reason: err.to_string(),
                    }
                }
            })
        })
        .await
    }

    async fn delete(&self, id: &UserId) -> Result<StoreWrite<()>, UserPersistenceError> {
        self.bounded("delete", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let deleted = diesel::delete(users::table.find(*id.as_uuid()))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(if deleted == 0 {
                StoreWrite::NotFound
            } else {
                StoreWrite::Written(())
            })
        })
        .await
    }

    async fn ping(&self) -> Result<(), UserPersistenceError> {
        self.bounded("ping", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::sql_query("SELECT 1")
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn close(&self) -> Result<(), UserPersistenceError> {
        self.pool.drain().await;
        Ok(())
    }
}
