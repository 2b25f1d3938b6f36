//! Notifications emitted after user mutations.
//!
//! Events are built right after a successful store write and handed to the
//! publisher once. They are never persisted. Consumers pick the payload shape
//! from the `action` tag:
//!
//! ```json
//! {"action": "created", "user_data": {"id": "...", "first_name": "...", ...}}
//! {"action": "deleted", "user_data": {"id": "..."}}
//! ```

use serde::Serialize;

use crate::domain::{User, UserId};

/// Payload of a `deleted` event; the record itself is already gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedUser {
    pub id: UserId,
}

/// Mutation notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "user_data", rename_all = "lowercase")]
pub enum UserEvent {
    /// A user was stored for the first time.
    Created(User),
    /// A user was overwritten; carries the post-write document.
    Updated(User),
    /// A user was removed.
    Deleted(DeletedUser),
}

impl UserEvent {
    /// Build a `deleted` event for `id`.
    #[must_use]
    pub fn deleted(id: UserId) -> Self {
        Self::Deleted(DeletedUser { id })
    }

    /// Wire name of the action tag.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted(_) => "deleted",
        }
    }

    /// Identifier of the affected user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Created(user) | Self::Updated(user) => *user.id(),
            Self::Deleted(deleted) => deleted.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserDetails;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;

    fn user() -> User {
        User::new(
            UserId::random(),
            UserDetails {
                first_name: "Frank".into(),
                last_name: "Castle".into(),
                nickname: "punisher".into(),
                password: "s3cr3t".into(),
                email: "frank@example.com".into(),
                country: "US".into(),
            },
            Utc::now(),
            Utc::now(),
        )
        .expect("valid user")
    }

    #[rstest]
    fn created_event_carries_full_user() {
        let user = user();
        let value = serde_json::to_value(UserEvent::Created(user.clone())).expect("serialise");
        assert_eq!(value["action"], "created");
        assert_eq!(
            value["user_data"],
            serde_json::to_value(&user).expect("serialise user")
        );
    }

    #[rstest]
    fn updated_event_uses_updated_tag() {
        let event = UserEvent::Updated(user());
        let value = serde_json::to_value(&event).expect("serialise");
        assert_eq!(value["action"], "updated");
        assert_eq!(event.action(), "updated");
    }

    #[rstest]
    fn deleted_event_carries_only_the_id() {
        let id = UserId::random();
        let event = UserEvent::deleted(id);
        let value = serde_json::to_value(&event).expect("serialise");
        assert_eq!(
            value,
            json!({ "action": "deleted", "user_data": { "id": id.to_string() } })
        );
        assert_eq!(event.user_id(), id);
    }
}
