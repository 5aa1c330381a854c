use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{ResourceStore, StoreError};
use crate::resources::Resource;

/// Flat-file backend: `<data_dir>/<resource>.json`, one pretty-printed array
/// per file.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, resource: Resource) -> PathBuf {
        self.data_dir.join(resource.file_name())
    }

    /// Creates the data directory and an empty array for every missing file.
    /// Returns the resources that were created.
    pub async fn init(&self) -> Result<Vec<Resource>, StoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let mut created = Vec::new();
        for resource in Resource::all() {
            let path = self.path_for(resource);
            if tokio::fs::try_exists(&path).await? {
                continue;
            }
            self.save(resource, &[]).await?;
            info!(resource = %resource, path = %path.display(), "created empty collection");
            created.push(resource);
        }
        Ok(created)
    }
}

#[async_trait]
impl ResourceStore for FileStore {
    fn kind(&self) -> &'static str {
        "file"
    }

    async fn load(&self, resource: Resource) -> Result<Vec<Value>, StoreError> {
        let path = self.path_for(resource);
        let bytes = tokio::fs::read(&path).await?;
        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Array(records) => {
                debug!(resource = %resource, count = records.len(), "loaded collection");
                Ok(records)
            }
            _ => Err(StoreError::NotAnArray { path }),
        }
    }

    async fn save(&self, resource: Resource, records: &[Value]) -> Result<(), StoreError> {
        let path = self.path_for(resource);
        let body = serde_json::to_vec_pretty(records)?;

        // Write beside the target, then rename over it.
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, &body).await?;
        tokio::fs::rename(&staging, &path).await?;

        debug!(resource = %resource, count = records.len(), "saved collection");
        Ok(())
    }
}
