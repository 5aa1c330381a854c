/*!
 * # Record Service
 *
 * Generic CRUD over the array-backed collections. Every mutation is a
 * whole-array read-modify-write; mutations of the same resource are
 * serialized by a per-resource lock so concurrent requests in this process
 * cannot lose each other's writes. Reads take no lock.
 */

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument};

use crate::{
    errors::{ApiResult, Operation, ServiceError},
    resources::Resource,
    services::{ids::next_sequential_id, search::ListFilter},
    store::{matches_id, merge_record, ResourceStore},
};

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn ResourceStore>,
    locks: Arc<DashMap<Resource, Arc<Mutex<()>>>>,
    assign_missing_ids: bool,
}

impl RecordService {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            locks: Arc::new(DashMap::new()),
            assign_missing_ids: false,
        }
    }

    /// Give POSTed objects without an `id` a sequential one.
    pub fn with_id_assignment(mut self, enabled: bool) -> Self {
        self.assign_missing_ids = enabled;
        self
    }

    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    async fn write_guard(&self, resource: Resource) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(resource).or_default().value());
        lock.lock_owned().await
    }

    async fn load(&self, resource: Resource, operation: Operation) -> ApiResult<Vec<Value>> {
        self.store
            .load(resource)
            .await
            .map_err(ServiceError::storage(operation))
    }

    async fn save(
        &self,
        resource: Resource,
        records: &[Value],
        operation: Operation,
    ) -> ApiResult<()> {
        self.store
            .save(resource, records)
            .await
            .map_err(ServiceError::storage(operation))
    }

    /// Whole collection in stored order.
    pub async fn all(&self, resource: Resource) -> ApiResult<Vec<Value>> {
        self.load(resource, Operation::Read).await
    }

    #[instrument(skip_all, fields(resource = %resource))]
    pub async fn list(&self, resource: Resource, filter: &ListFilter) -> ApiResult<Vec<Value>> {
        let records = self.load(resource, Operation::Read).await?;
        Ok(filter.apply(resource, records))
    }

    /// Appends `record` as given (plus an id when assignment is enabled).
    #[instrument(skip_all, fields(resource = %resource))]
    pub async fn create(&self, resource: Resource, mut record: Value) -> ApiResult<Value> {
        let _guard = self.write_guard(resource).await;
        let mut records = self.load(resource, Operation::Add).await?;

        if self.assign_missing_ids {
            if let Some(fields) = record.as_object_mut() {
                if !fields.contains_key("id") {
                    let id = next_sequential_id(resource.id_prefix(), &records);
                    debug!(id = %id, "assigned id");
                    fields.insert("id".to_string(), Value::String(id));
                }
            }
        }

        records.push(record.clone());
        self.save(resource, &records, Operation::Add).await?;
        info!(count = records.len(), "record added");
        Ok(record)
    }

    /// Shallow-merges `patch` into the first record with this id.
    #[instrument(skip_all, fields(resource = %resource, id = %id))]
    pub async fn update(&self, resource: Resource, id: &str, patch: &Value) -> ApiResult<Value> {
        self.modify(resource, id, |record| {
            merge_record(record, patch);
            Ok(())
        })
        .await
    }

    /// Applies `change` to the first record with this id and persists the
    /// array. An `Err` from `change` aborts without writing.
    pub async fn modify<F>(&self, resource: Resource, id: &str, change: F) -> ApiResult<Value>
    where
        F: FnOnce(&mut Value) -> ApiResult<()>,
    {
        let _guard = self.write_guard(resource).await;
        let mut records = self.load(resource, Operation::Update).await?;

        let record = records
            .iter_mut()
            .find(|record| matches_id(record, id))
            .ok_or_else(|| ServiceError::NotFound(format!("{} {}", resource, id)))?;
        change(record)?;
        let updated = record.clone();

        self.save(resource, &records, Operation::Update).await?;
        info!(resource = %resource, id = %id, "record updated");
        Ok(updated)
    }

    /// Removes the first record with this id; the rest keep their order.
    #[instrument(skip_all, fields(resource = %resource, id = %id))]
    pub async fn delete(&self, resource: Resource, id: &str) -> ApiResult<Value> {
        let _guard = self.write_guard(resource).await;
        let mut records = self.load(resource, Operation::Delete).await?;

        let index = records
            .iter()
            .position(|record| matches_id(record, id))
            .ok_or_else(|| ServiceError::NotFound(format!("{} {}", resource, id)))?;
        let removed = records.remove(index);

        self.save(resource, &records, Operation::Delete).await?;
        info!(count = records.len(), "record deleted");
        Ok(removed)
    }

    /// Overwrites a whole collection.
    pub async fn replace_all(&self, resource: Resource, records: Vec<Value>) -> ApiResult<()> {
        let _guard = self.write_guard(resource).await;
        self.save(resource, &records, Operation::Update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn service_with(records: Vec<Value>) -> RecordService {
        RecordService::new(Arc::new(MemoryStore::with_collections([(
            Resource::Requests,
            records,
        )])))
    }

    #[tokio::test]
    async fn create_keeps_body_as_is_by_default() {
        let service = service_with(vec![]);
        let created = service
            .create(Resource::Requests, json!({"department": "ICU"}))
            .await
            .unwrap();
        assert_eq!(created, json!({"department": "ICU"}));
    }

    #[tokio::test]
    async fn create_assigns_ids_when_enabled() {
        let service = service_with(vec![json!({"id": "REQ004"})]).with_id_assignment(true);
        let created = service
            .create(Resource::Requests, json!({"department": "ICU"}))
            .await
            .unwrap();
        assert_eq!(created["id"], "REQ005");

        let explicit = service
            .create(Resource::Requests, json!({"id": "custom"}))
            .await
            .unwrap();
        assert_eq!(explicit, json!({"id": "custom"}));
    }

    #[tokio::test]
    async fn update_touches_only_first_match() {
        let service = service_with(vec![
            json!({"id": "REQ001", "status": "Pending"}),
            json!({"id": "REQ001", "status": "Pending"}),
        ]);
        let updated = service
            .update(Resource::Requests, "REQ001", &json!({"status": "Completed"}))
            .await
            .unwrap();
        assert_eq!(updated["status"], "Completed");

        let all = service.all(Resource::Requests).await.unwrap();
        assert_eq!(all[0]["status"], "Completed");
        assert_eq!(all[1]["status"], "Pending");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let service = service_with(vec![json!({"id": "REQ001"})]);
        assert_matches!(
            service
                .update(Resource::Requests, "REQ404", &json!({}))
                .await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(
            service.delete(Resource::Requests, "REQ404").await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn failed_change_is_not_persisted() {
        let service = service_with(vec![json!({"id": "REQ001", "status": "Pending"})]);
        let result = service
            .modify(Resource::Requests, "REQ001", |record| {
                record["status"] = json!("Broken");
                Err(ServiceError::Conflict("nope".into()))
            })
            .await;
        assert_matches!(result, Err(ServiceError::Conflict(_)));
        assert_eq!(
            service.all(Resource::Requests).await.unwrap()[0]["status"],
            "Pending"
        );
    }

    #[tokio::test]
    async fn concurrent_creates_are_not_lost() {
        let service = service_with(vec![]);
        let tasks: Vec<_> = (0..32)
            .map(|n| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .create(Resource::Requests, json!({"id": format!("REQ{n:03}")}))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(service.all(Resource::Requests).await.unwrap().len(), 32);
    }
}
