/*!
 * # Collection Storage
 *
 * Every resource is one JSON array persisted as a whole. A `ResourceStore`
 * only knows how to load and save those arrays; read-modify-write cycles
 * and their locking live in `services::records`.
 */

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

use crate::resources::Resource;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path} does not hold a JSON array")]
    NotAnArray { path: PathBuf },
}

/// Backend holding one array per resource.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Short backend name, reported by the health endpoint.
    fn kind(&self) -> &'static str;

    async fn load(&self, resource: Resource) -> Result<Vec<Value>, StoreError>;

    async fn save(&self, resource: Resource, records: &[Value]) -> Result<(), StoreError>;
}

/// True when `record` is an object whose `id` is the string `id`.
pub fn matches_id(record: &Value, id: &str) -> bool {
    record.get("id").and_then(Value::as_str) == Some(id)
}

/// Shallow merge of `patch` into `target`, later keys winning.
///
/// Object patches overwrite or append keys. Array patches contribute their
/// elements under `"0"`, `"1"`, ... Scalars and `null` leave `target` as is.
pub fn merge_record(target: &mut Value, patch: &Value) {
    let Some(fields) = target.as_object_mut() else {
        return;
    };
    match patch {
        Value::Object(updates) => {
            for (key, value) in updates {
                fields.insert(key.clone(), value.clone());
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                fields.insert(index.to_string(), value.clone());
            }
        }
        _ => {}
    }
}
