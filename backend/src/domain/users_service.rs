//! User use-case service implementing the driving ports.
//!
//! Writes follow one sequence: validate, mutate the store, then publish a
//! notification. The store is authoritative for the outcome. Publishing is
//! best effort: a failed publish is logged and never changes the result the
//! caller sees.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, warn};

use crate::domain::ports::{
    StoreWrite, UserEventPublisher, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::{
    Error, ListQuery, ListUsersParams, User, UserDetails, UserEvent, UserId, UserUpdate,
    truncate_to_millis, validate_user_details,
};

const USER_NOT_FOUND: &str = "user not found";

/// Result of a store write paired with the event it warrants, if any.
struct MutationOutcome<T> {
    result: Result<T, Error>,
    event: Option<UserEvent>,
}

impl<T> MutationOutcome<T> {
    fn publish(value: T, event: UserEvent) -> Self {
        Self {
            result: Ok(value),
            event: Some(event),
        }
    }

    fn silent(result: Result<T, Error>) -> Self {
        Self {
            result,
            event: None,
        }
    }
}

/// User service implementing [`UsersCommand`] and [`UsersQuery`].
///
/// The store and publisher may be concrete adapters or trait objects
/// (`UsersService<dyn UserRepository, dyn UserEventPublisher>`).
pub struct UsersService<R: ?Sized, P: ?Sized> {
    users_repo: Arc<R>,
    publisher: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized, P: ?Sized> Clone for UsersService<R, P> {
    fn clone(&self) -> Self {
        Self {
            users_repo: Arc::clone(&self.users_repo),
            publisher: Arc::clone(&self.publisher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: ?Sized, P: ?Sized> UsersService<R, P> {
    /// Create a new service over the given store and publisher.
    pub fn new(users_repo: Arc<R>, publisher: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users_repo,
            publisher,
            clock,
        }
    }
}

impl<R, P> UsersService<R, P>
where
    R: UserRepository + ?Sized,
    P: UserEventPublisher + ?Sized,
{
    async fn finish<T>(&self, outcome: MutationOutcome<T>) -> Result<T, Error> {
        if let Some(event) = outcome.event {
            self.publish_best_effort(&event).await;
        }
        outcome.result
    }

    async fn publish_best_effort(&self, event: &UserEvent) {
        if let Err(err) = self.publisher.publish(event).await {
            error!(
                user_id = %event.user_id(),
                action = event.action(),
                error = %err,
                "failed to publish user event"
            );
        }
    }

    async fn create_outcome(&self, details: UserDetails) -> Result<MutationOutcome<User>, Error> {
        let now = self.clock.utc();
        let user = User::new(UserId::random(), details, now, now)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        if let Err(err) = self.users_repo.create(&user).await {
            error!(user_id = %user.id(), error = %err, "failed to create user");
            return Ok(MutationOutcome::silent(Err(Error::internal(
                "user not created",
            ))));
        }
        Ok(MutationOutcome::publish(
            user.clone(),
            UserEvent::Created(user),
        ))
    }

    async fn update_outcome(
        &self,
        id: &UserId,
        details: UserDetails,
    ) -> Result<MutationOutcome<()>, Error> {
        validate_user_details(&details).map_err(|err| Error::invalid_request(err.to_string()))?;
        let update = UserUpdate {
            id: *id,
            details,
            updated_at: truncate_to_millis(self.clock.utc()),
        };

        let outcome = match self.users_repo.update(&update).await {
            Ok(StoreWrite::Written(user)) => {
                MutationOutcome::publish((), UserEvent::Updated(user))
            }
            Ok(StoreWrite::NotFound) => {
                MutationOutcome::silent(Err(Error::not_found(USER_NOT_FOUND)))
            }
            Ok(StoreWrite::WrittenButUndecodable { reason }) => {
                warn!(
                    user_id = %id,
                    reason = %reason,
                    "user updated but stored document could not be decoded; skipping event"
                );
                MutationOutcome::silent(Ok(()))
            }
            Err(err) => {
                error!(user_id = %id, error = %err, "failed to update user");
                MutationOutcome::silent(Err(Error::internal("user not updated")))
            }
        };
        Ok(outcome)
    }

    async fn delete_outcome(&self, id: &UserId) -> MutationOutcome<()> {
        match self.users_repo.delete(id).await {
            Ok(StoreWrite::Written(())) | Ok(StoreWrite::WrittenButUndecodable { .. }) => {
                MutationOutcome::publish((), UserEvent::deleted(*id))
            }
            Ok(StoreWrite::NotFound) => {
                MutationOutcome::silent(Err(Error::not_found(USER_NOT_FOUND)))
            }
            Err(err) => {
                error!(user_id = %id, error = %err, "failed to delete user");
                MutationOutcome::silent(Err(Error::internal("user not deleted")))
            }
        }
    }
}

#[async_trait]
impl<R, P> UsersCommand for UsersService<R, P>
where
    R: UserRepository + ?Sized,
    P: UserEventPublisher + ?Sized,
{
    async fn create_user(&self, details: UserDetails) -> Result<User, Error> {
        let outcome = self.create_outcome(details).await?;
        self.finish(outcome).await
    }

    async fn update_user(&self, id: &UserId, details: UserDetails) -> Result<(), Error> {
        let outcome = self.update_outcome(id, details).await?;
        self.finish(outcome).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        let outcome = self.delete_outcome(id).await;
        self.finish(outcome).await
    }
}

#[async_trait]
impl<R, P> UsersQuery for UsersService<R, P>
where
    R: UserRepository + ?Sized,
    P: UserEventPublisher + ?Sized,
{
    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        match self.users_repo.find_by_id(id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(Error::not_found(USER_NOT_FOUND)),
            Err(err) => {
                error!(user_id = %id, error = %err, "failed to fetch user");
                Err(Error::internal("user not retrieved"))
            }
        }
    }

    async fn list_users(&self, params: ListUsersParams) -> Result<Vec<User>, Error> {
        let query =
            ListQuery::parse(params).map_err(|err| Error::invalid_request(err.to_string()))?;
        self.users_repo.list(&query).await.map_err(|err| {
            error!(error = %err, ?query, "failed to list users");
            Error::internal("users not retrieved")
        })
    }
}

#[cfg(test)]
#[path = "users_service_tests.rs"]
mod tests;
