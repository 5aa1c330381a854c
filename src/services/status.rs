//! Status-tag transitions for CSSD records.

use chrono::{DateTime, Local, SecondsFormat};
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::{info, instrument, warn};

use crate::{
    errors::{ApiResult, ServiceError},
    models::{SterilizationStatus, WorkflowStage},
    resources::Resource,
    services::records::RecordService,
};

#[derive(Clone)]
pub struct StatusService {
    records: RecordService,
}

impl StatusService {
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }

    /// Sets the status tag of one record after checking it against the
    /// resource's vocabulary.
    #[instrument(skip_all, fields(resource = %resource, id = %id))]
    pub async fn set_status(&self, resource: Resource, id: &str, status: &str) -> ApiResult<Value> {
        let status = validate_status(resource, status)?;
        let updated = self
            .records
            .modify(resource, id, |record| {
                apply_status(resource, fields_mut(record)?, &status, Local::now());
                Ok(())
            })
            .await?;
        info!(id = %id, status = %status, "status updated");
        Ok(updated)
    }

    /// Moves a workflow entry to the next stage.
    #[instrument(skip(self))]
    pub async fn advance_workflow(&self, id: &str) -> ApiResult<Value> {
        let resource = Resource::WorkflowEntries;
        self.records
            .modify(resource, id, |record| {
                let fields = fields_mut(record)?;
                let current = fields
                    .get(resource.status_field())
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let stage = WorkflowStage::from_str(current).map_err(|_| {
                    ServiceError::Conflict(format!(
                        "Item {} has unknown stage '{}' and cannot be advanced.",
                        id, current
                    ))
                })?;
                let next = stage.next().ok_or_else(|| {
                    ServiceError::Conflict(format!("Item {} is already {}.", id, stage))
                })?;
                apply_status(resource, fields, <&str>::from(next), Local::now());
                info!(id = %id, from = %stage, to = %next, "workflow advanced");
                Ok(())
            })
            .await
    }
}

fn fields_mut(record: &mut Value) -> ApiResult<&mut Map<String, Value>> {
    record
        .as_object_mut()
        .ok_or_else(|| ServiceError::BadRequest("Record is not an object.".to_string()))
}

/// Trimmed status if the resource accepts it.
pub fn validate_status(resource: Resource, status: &str) -> ApiResult<String> {
    let status = status.trim();
    if status.is_empty() {
        return Err(ServiceError::ValidationError(
            "Status must not be empty.".to_string(),
        ));
    }
    if let Some(allowed) = resource.status_vocabulary() {
        if !allowed.contains(&status) {
            warn!(resource = %resource, status = %status, "rejected unknown status");
            return Err(ServiceError::ValidationError(format!(
                "Invalid status '{}'. Valid statuses are: {}.",
                status,
                allowed.join(", ")
            )));
        }
    }
    Ok(status.to_string())
}

/// Writes the status field plus the timestamps that travel with it.
pub fn apply_status(
    resource: Resource,
    fields: &mut Map<String, Value>,
    status: &str,
    now: DateTime<Local>,
) {
    fields.insert(
        resource.status_field().to_string(),
        Value::String(status.to_string()),
    );

    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    match resource {
        Resource::WorkflowEntries => {
            fields.insert("timestamp".to_string(), Value::String(stamp));
        }
        Resource::StockItems => {
            fields.insert("lastUpdated".to_string(), Value::String(stamp));
        }
        Resource::SterilizationProcesses
            if status == <&str>::from(SterilizationStatus::Completed) =>
        {
            fields.insert(
                "endTime".to_string(),
                Value::String(now.format("%H:%M").to_string()),
            );
        }
        _ => {}
    }
}
