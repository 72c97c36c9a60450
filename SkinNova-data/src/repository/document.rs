use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::errors::RepositoryError;

/// A record stored as a JSON document in a named collection
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection the document lives in
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Backend that persists JSON documents keyed by `(collection, id)`
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Insert a document or replace an existing one with the same id
    async fn put(&self, collection: &str, id: &str, body: Value) -> Result<(), RepositoryError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, RepositoryError>;

    /// Returns whether a document was removed
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RepositoryError>;

    /// All documents of a collection in insertion order
    async fn list(&self, collection: &str) -> Result<Vec<Value>, RepositoryError>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Short name of the backend for diagnostics
    fn backend(&self) -> &'static str;
}

/// Shared handle to a document store
pub type SharedDocumentStore = Arc<dyn DocumentStore>;

/// Typed view over one collection of a [`DocumentStore`]
pub struct Collection<T> {
    store: SharedDocumentStore,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("store", &self.store)
            .finish()
    }
}

impl<T: Document> Collection<T> {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Insert or replace the document
    pub async fn save(&self, document: &T) -> Result<(), RepositoryError> {
        let body = serde_json::to_value(document)?;
        self.store.put(T::COLLECTION, document.id(), body).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, RepositoryError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<T>, RepositoryError> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(|body| serde_json::from_value(body).map_err(RepositoryError::from))
            .collect()
    }

    /// All documents matching the predicate
    pub async fn find<F>(&self, predicate: F) -> Result<Vec<T>, RepositoryError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let documents = self.find_all().await?;
        Ok(documents.into_iter().filter(|doc| predicate(doc)).collect())
    }

    pub async fn find_one<F>(&self, predicate: F) -> Result<Option<T>, RepositoryError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let documents = self.find_all().await?;
        Ok(documents.into_iter().find(|doc| predicate(doc)))
    }

    pub async fn remove(&self, id: &str) -> Result<bool, RepositoryError> {
        self.store.delete(T::COLLECTION, id).await
    }

    /// Remove every document matching the predicate, returning how many were removed
    pub async fn remove_where<F>(&self, predicate: F) -> Result<usize, RepositoryError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let mut removed = 0;
        for document in self.find(predicate).await? {
            if self.store.delete(T::COLLECTION, document.id()).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
