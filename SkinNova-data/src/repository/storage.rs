use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use crate::database::{DatabasePool, SqlitePool};
use super::document::DocumentStore;
use super::errors::RepositoryError;

/// Document store backed by the `documents` table of a SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: Arc<SqlitePool>,
}

impl SqliteDocumentStore {
    pub fn new(pool: &DatabasePool) -> Self {
        let DatabasePool::SQLite(pool) = pool;
        Self {
            pool: Arc::clone(pool),
        }
    }

    /// Run a blocking closure against a pooled connection
    async fn with_connection<F, R>(&self, op: F) -> Result<R, RepositoryError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<R, RepositoryError> + Send + 'static,
        R: Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            op(&conn)
        })
        .await
        .map_err(|e| RepositoryError::Task(e.to_string()))?
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn put(&self, collection: &str, id: &str, body: Value) -> Result<(), RepositoryError> {
        debug!("Storing document {}/{}", collection, id);
        let collection = collection.to_string();
        let id = id.to_string();
        let body = serde_json::to_string(&body)?;

        self.with_connection(move |conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO documents (collection, id, body, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT (collection, id)
                 DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
                params![collection, id, body, now],
            )?;
            Ok(())
        })
        .await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, RepositoryError> {
        let collection = collection.to_string();
        let id = id.to_string();

        let body = self
            .with_connection(move |conn| {
                let body = conn
                    .query_row(
                        "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                        params![collection, id],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(body)
            })
            .await?;

        body.map(|body| serde_json::from_str(&body).map_err(RepositoryError::from))
            .transpose()
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RepositoryError> {
        debug!("Deleting document {}/{}", collection, id);
        let collection = collection.to_string();
        let id = id.to_string();

        self.with_connection(move |conn| {
            let removed = conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, RepositoryError> {
        let collection = collection.to_string();

        let bodies = self
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT body FROM documents WHERE collection = ?1 ORDER BY rowid",
                )?;
                let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

                let mut bodies = Vec::new();
                for row in rows {
                    bodies.push(row?);
                }
                Ok(bodies)
            })
            .await?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(RepositoryError::from))
            .collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
