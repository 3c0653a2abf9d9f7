use crate::error::CoreError;
use crate::models::{Habit, Task, UserId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Executor, Sqlite};
use std::marker::PhantomData;
use uuid::Uuid;

/// An entity that can be stored as a JSON document.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Unpin {
    fn id(&self) -> Uuid;
    fn owner_id(&self) -> &UserId;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

impl Document for Habit {
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Document for Task {
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Registry object for one entity type's slice of the `documents` table.
///
/// Built once when the repository is constructed and handed to every
/// read and write for that type. All lookups are scoped to an owner, so a
/// document belonging to someone else reads as missing.
pub struct Collection<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Collection<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn decode(body: &str) -> Result<T, CoreError> {
        Ok(serde_json::from_str(body)?)
    }

    pub(crate) fn decode_all(bodies: Vec<String>) -> Result<Vec<T>, CoreError> {
        bodies.iter().map(|b| Self::decode(b)).collect()
    }

    pub async fn find<'e, E>(&self, executor: E, owner: &UserId, id: Uuid) -> Result<Option<T>, CoreError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let body: Option<String> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND owner_id = $2 AND id = $3",
        )
        .bind(self.name)
        .bind(owner.as_str())
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

        body.as_deref().map(Self::decode).transpose()
    }

    pub async fn find_all<'e, E>(&self, executor: E, owner: &UserId) -> Result<Vec<T>, CoreError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND owner_id = $2 ORDER BY created_at, id",
        )
        .bind(self.name)
        .bind(owner.as_str())
        .fetch_all(executor)
        .await?;

        Self::decode_all(bodies)
    }

    pub async fn find_by_id_prefix<'e, E>(
        &self,
        executor: E,
        owner: &UserId,
        prefix: &str,
    ) -> Result<Vec<T>, CoreError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        // Ids are hyphenated hex; anything else could act as a LIKE wildcard
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Ok(Vec::new());
        }

        let mut pattern = String::with_capacity(prefix.len() + 1);
        pattern.push_str(&prefix.to_lowercase());
        pattern.push('%');

        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND owner_id = $2 AND id LIKE $3",
        )
        .bind(self.name)
        .bind(owner.as_str())
        .bind(pattern)
        .fetch_all(executor)
        .await?;

        Self::decode_all(bodies)
    }

    pub async fn insert<'e, E>(&self, executor: E, doc: &T) -> Result<(), CoreError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let body = serde_json::to_string(doc)?;
        sqlx::query(
            r#"INSERT INTO documents (id, collection, owner_id, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(doc.id().to_string())
        .bind(self.name)
        .bind(doc.owner_id().as_str())
        .bind(body)
        .bind(doc.created_at())
        .bind(doc.updated_at())
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Overwrites the stored document. Last writer wins.
    pub async fn replace<'e, E>(&self, executor: E, doc: &T) -> Result<(), CoreError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let body = serde_json::to_string(doc)?;
        let result = sqlx::query(
            r#"UPDATE documents SET body = $1, updated_at = $2
            WHERE collection = $3 AND owner_id = $4 AND id = $5"#,
        )
        .bind(body)
        .bind(doc.updated_at())
        .bind(self.name)
        .bind(doc.owner_id().as_str())
        .bind(doc.id().to_string())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(doc.id().to_string()));
        }
        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, owner: &UserId, id: Uuid) -> Result<(), CoreError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "DELETE FROM documents WHERE collection = $1 AND owner_id = $2 AND id = $3",
        )
        .bind(self.name)
        .bind(owner.as_str())
        .bind(id.to_string())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
