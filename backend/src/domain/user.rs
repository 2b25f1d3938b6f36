//! User data model.

use std::fmt;

use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{UserValidationError, validate_user_details};

/// Stable user identifier stored as a UUID.
///
/// Identifiers are generated server-side on creation and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier supplied by a client, e.g. a path segment.
    ///
    /// # Errors
    /// Returns the UUID parser error when `raw` is not a UUID.
    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw).map(Self)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Client-editable user fields as received from a request body.
///
/// Values are not validated on construction; run them through
/// [`validate_user_details`] before they reach the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDetails {
    /// Given name.
    #[schema(example = "Frank")]
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[schema(example = "Castle")]
    #[serde(default)]
    pub last_name: String,
    /// Public nickname.
    #[schema(example = "punisher")]
    #[serde(default)]
    pub nickname: String,
    /// Opaque password string.
    #[schema(example = "s3cr3t")]
    #[serde(default)]
    pub password: String,
    /// Mailbox address.
    #[schema(example = "frank.castle@example.com")]
    #[serde(default)]
    pub email: String,
    /// Country code or name.
    #[schema(example = "US")]
    #[serde(default)]
    pub country: String,
}

/// Truncate a timestamp to the store's millisecond precision.
///
/// Keeping timestamps at millisecond precision makes values read back from
/// the store compare equal to the values that were written.
#[must_use]
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(at)
}

fn serialize_timestamp<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Application user.
///
/// ## Invariants
/// - all six textual fields are non-empty and `email` is a valid mailbox.
/// - timestamps are truncated to millisecond precision.
///
/// Deserialisation enforces the same invariants, so a stored document that
/// violates them fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "UserDocument")]
pub struct User {
    #[schema(value_type = String, format = Uuid, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[serde(flatten)]
    details: UserDetails,
    #[schema(value_type = String, format = DateTime, example = "2024-05-01T10:15:30.123Z")]
    #[serde(serialize_with = "serialize_timestamp")]
    created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime, example = "2024-05-01T10:15:30.123Z")]
    #[serde(serialize_with = "serialize_timestamp")]
    updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user from its parts, validating the textual fields.
    ///
    /// # Errors
    /// Returns the first violated validation rule.
    pub fn new(
        id: UserId,
        details: UserDetails,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, UserValidationError> {
        validate_user_details(&details)?;
        Ok(Self {
            id,
            details,
            created_at: truncate_to_millis(created_at),
            updated_at: truncate_to_millis(updated_at),
        })
    }

    /// Stable user identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Client-editable fields.
    #[must_use]
    pub fn details(&self) -> &UserDetails {
        &self.details
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Replacement values applied by an update.
///
/// There is no `created_at` here: updates cannot alter the creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    /// Target user.
    pub id: UserId,
    /// New field values, already validated.
    pub details: UserDetails,
    /// New last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct UserDocument {
    id: Uuid,
    first_name: String,
    last_name: String,
    nickname: String,
    password: String,
    email: String,
    country: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserDocument> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDocument) -> Result<Self, Self::Error> {
        let UserDocument {
            id,
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
            created_at,
            updated_at,
        } = value;
        let details = UserDetails {
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
        };
        User::new(UserId::from_uuid(id), details, created_at, updated_at)
    }
}

#[cfg(test)]
mod tests;
