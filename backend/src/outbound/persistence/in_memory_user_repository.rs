//! In-process document store for users.
//!
//! Users are kept as JSON documents, the same shape the service emits on the
//! wire, so decoding on read is a real step that can fail. The store backs
//! the service when no database is configured and serves as the store for
//! the HTTP end-to-end tests.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{StoreWrite, UserPersistenceError, UserRepository};
use crate::domain::{ListQuery, User, UserId, UserUpdate};

use super::user_query::{SortOrder, UserListQuery};

type Documents = BTreeMap<Uuid, Map<String, Value>>;

/// JSON document store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    documents: RwLock<Documents>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw document, bypassing encoding.
    ///
    /// Lets callers seed documents the service itself would never write,
    /// such as records that no longer decode.
    pub async fn insert_raw_document(&self, id: UserId, document: Map<String, Value>) {
        self.documents.write().await.insert(*id.as_uuid(), document);
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn encode(user: &User) -> Result<Map<String, Value>, UserPersistenceError> {
    match serde_json::to_value(user) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(UserPersistenceError::query("user did not encode to a document")),
        Err(err) => Err(UserPersistenceError::query(err.to_string())),
    }
}

fn decode(document: &Map<String, Value>) -> Result<User, serde_json::Error> {
    serde_json::from_value(Value::Object(document.clone()))
}

fn matches(document: &Map<String, Value>, options: &UserListQuery) -> bool {
    options.filters.iter().all(|(field, expected)| {
        document
            .get(field.name())
            .and_then(Value::as_str)
            .is_some_and(|actual| actual == expected)
    })
}

fn compare(
    left: &(Uuid, &Map<String, Value>),
    right: &(Uuid, &Map<String, Value>),
    options: &UserListQuery,
) -> Ordering {
    let key = options.sort_field.name();
    let left_value = left.1.get(key).and_then(Value::as_str);
    let right_value = right.1.get(key).and_then(Value::as_str);
    let ordering = match options.order {
        SortOrder::Ascending => left_value.cmp(&right_value),
        SortOrder::Descending => right_value.cmp(&left_value),
    };
    ordering.then_with(|| left.0.cmp(&right.0))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let document = encode(user)?;
        let mut documents = self.documents.write().await;
        if documents.contains_key(user.id().as_uuid()) {
            return Err(UserPersistenceError::query(format!(
                "duplicate user id {}",
                user.id()
            )));
        }
        documents.insert(*user.id().as_uuid(), document);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let documents = self.documents.read().await;
        documents
            .get(id.as_uuid())
            .map(decode)
            .transpose()
            .map_err(|err| UserPersistenceError::query(format!("stored user {id}: {err}")))
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<User>, UserPersistenceError> {
        let options =
            UserListQuery::build(query).map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let documents = self.documents.read().await;

        let mut selected: Vec<(Uuid, &Map<String, Value>)> = documents
            .iter()
            .filter(|(_, document)| matches(document, &options))
            .map(|(id, document)| (*id, document))
            .collect();
        selected.sort_by(|left, right| compare(left, right, &options));

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        selected
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|(id, document)| {
                decode(document)
                    .map_err(|err| UserPersistenceError::query(format!("stored user {id}: {err}")))
            })
            .collect()
    }

    async fn update(
        &self,
        update: &UserUpdate,
    ) -> Result<StoreWrite<User>, UserPersistenceError> {
        let mut documents = self.documents.write().await;
        let Some(document) = documents.get_mut(update.id.as_uuid()) else {
            return Ok(StoreWrite::NotFound);
        };

        let details = &update.details;
        for (key, value) in [
            ("first_name", &details.first_name),
            ("last_name", &details.last_name),
            ("nickname", &details.nickname),
            ("password", &details.password),
            ("email", &details.email),
            ("country", &details.country),
        ] {
            document.insert(key.to_owned(), Value::String(value.clone()));
        }
        document.insert(
            "updated_at".to_owned(),
            Value::String(
                update
                    .updated_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        );

        Ok(match decode(document) {
            Ok(user) => StoreWrite::Written(user),
            Err(err) => StoreWrite::WrittenButUndecodable {
                reason: err.to_string(),
            },
        })
    }

    async fn delete(&self, id: &UserId) -> Result<StoreWrite<()>, UserPersistenceError> {
        let removed = self.documents.write().await.remove(id.as_uuid());
        Ok(match removed {
            Some(_) => StoreWrite::Written(()),
            None => StoreWrite::NotFound,
        })
    }

    async fn ping(&self) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), UserPersistenceError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "in_memory_user_repository_tests.rs"]
mod tests;
