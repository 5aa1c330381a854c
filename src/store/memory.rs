use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ResourceStore, StoreError};
use crate::resources::Resource;

/// In-process backend mirroring the browser-local store: a collection that
/// was never written reads as empty.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Resource, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given collections.
    pub fn with_collections(collections: impl IntoIterator<Item = (Resource, Vec<Value>)>) -> Self {
        Self {
            collections: RwLock::new(collections.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, resource: Resource) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&resource).cloned().unwrap_or_default())
    }

    async fn save(&self, resource: Resource, records: &[Value]) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections.insert(resource, records.to_vec());
        Ok(())
    }
}
