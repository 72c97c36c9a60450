use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use super::document::DocumentStore;
use super::errors::RepositoryError;

type Collections = IndexMap<String, IndexMap<String, Value>>;

/// In-memory document store, used when no database is available and in tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn put(&self, collection: &str, id: &str, body: Value) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), body);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, RepositoryError> {
        let collections = self.collections.read()?;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write()?;
        Ok(collections
            .get_mut(collection)
            .map_or(false, |docs| docs.shift_remove(id).is_some()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, RepositoryError> {
        let collections = self.collections.read()?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        let _guard = self.collections.read()?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
