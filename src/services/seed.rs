//! Sample collections for a fresh install or a demo environment.

use chrono::{Local, SecondsFormat};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    errors::ApiResult,
    models::{
        CssdRequest, IssueStatus, IssuedItem, ItemUsage, KitStatus, PackageKit, Priority,
        ProcessType, ReceiptStatus, ReceivedItem, RequestStatus, SterilizationProcess,
        SterilizationStatus, StockItem, StockStatus, SurgeryReport, WorkflowEntry, WorkflowStage,
    },
    resources::Resource,
    services::records::RecordService,
};

fn to_values<T: Serialize>(records: Vec<T>) -> Vec<Value> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::to_value(record) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "skipping unserializable sample record");
                None
            }
        })
        .collect()
}

/// Sample records for one collection; `None` for collections that start empty.
pub fn sample_records(resource: Resource) -> Option<Vec<Value>> {
    let now = Local::now();
    let today = now.format("%Y-%m-%d").to_string();
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let clock = now.format("%H:%M").to_string();

    let records = match resource {
        Resource::Requests => to_values(vec![
            CssdRequest {
                id: "REQ001".into(),
                department: "OR-1".into(),
                priority: Priority::High,
                items: "Surgical instruments set".into(),
                quantity: 2,
                status: RequestStatus::Pending,
                date: today.clone(),
                created_at: Some(stamp.clone()),
                required_date: None,
            },
            CssdRequest {
                id: "REQ002".into(),
                department: "ICU".into(),
                priority: Priority::Medium,
                items: "Catheters and tubing".into(),
                quantity: 5,
                status: RequestStatus::Processing,
                date: today.clone(),
                created_at: Some(stamp.clone()),
                required_date: None,
            },
        ]),
        Resource::ReceivedItems => to_values(vec![ReceivedItem {
            id: "REC001".into(),
            request_id: "REQ001".into(),
            department: "OR-1".into(),
            items: "Surgical instruments set".into(),
            quantity: 2,
            received_quantity: 2,
            status: ReceiptStatus::FullyReceived,
            received_at: stamp.clone(),
            received_date: today.clone(),
        }]),
        Resource::IssuedItems => to_values(vec![IssuedItem {
            id: "ISS001".into(),
            request_id: "REQ001".into(),
            department: "OR-1".into(),
            items: "Surgical instruments set".into(),
            quantity: 1,
            issued_time: clock.clone(),
            issued_date: today.clone(),
            status: IssueStatus::Issued,
            outlet: "OR-1".into(),
        }]),
        Resource::PackageKits => to_values(vec![PackageKit {
            id: "KIT001".into(),
            name: "Emergency Kit".into(),
            items: ["Scalpel", "Forceps", "Sutures", "Gauze"]
                .into_iter()
                .map(String::from)
                .collect(),
            department: "Emergency".into(),
            priority: Priority::High,
            status: KitStatus::Requested,
            quantity: 10,
            creation_date: stamp.clone(),
        }]),
        Resource::StockItems => to_values(vec![
            StockItem {
                id: "STK001".into(),
                name: "Surgical Masks".into(),
                category: "PPE".into(),
                quantity: 500,
                min_quantity: 100,
                max_quantity: 1000,
                unit: "pieces".into(),
                last_updated: stamp.clone(),
                status: StockStatus::from_levels(500, 100),
            },
            StockItem {
                id: "STK002".into(),
                name: "Sterile Gloves".into(),
                category: "PPE".into(),
                quantity: 50,
                min_quantity: 100,
                max_quantity: 500,
                unit: "boxes".into(),
                last_updated: stamp.clone(),
                status: StockStatus::from_levels(50, 100),
            },
        ]),
        Resource::SterilizationProcesses => to_values(vec![SterilizationProcess {
            id: "STE001".into(),
            item_id: "REQ002".into(),
            machine: "Autoclave-1".into(),
            process_type: ProcessType::Steam,
            start_time: clock.clone(),
            end_time: String::new(),
            status: SterilizationStatus::InProgress,
            operator: None,
            temperature: Some(134.0),
            pressure: None,
            duration: Some(45),
        }]),
        Resource::ConsumptionReports => to_values(vec![SurgeryReport {
            id: "SURG001".into(),
            surgery_id: "S-1001".into(),
            surgery_type: "Appendectomy".into(),
            department: "OR-1".into(),
            date: today.clone(),
            before_count: 20,
            after_count: 17,
            consumed: Some(3),
            items_used: vec![ItemUsage {
                name: "Basic Surgery Kit".into(),
                quantity: 3,
            }],
        }]),
        Resource::WorkflowEntries => to_values(vec![WorkflowEntry {
            id: "WF001".into(),
            request_id: "REQ001".into(),
            kit_id: "KIT001".into(),
            sterilization_id: "STE001".into(),
            current_status: WorkflowStage::Issued,
            timestamp: stamp,
            location: "OR-1".into(),
        }]),
        Resource::Dashboard => return None,
    };
    Some(records)
}

/// Writes sample data into empty collections, or into all of them when
/// `force` is set. Returns how many records each touched collection got.
pub async fn seed(records: &RecordService, force: bool) -> ApiResult<Vec<(Resource, usize)>> {
    let mut seeded = Vec::new();
    for resource in Resource::all() {
        let Some(samples) = sample_records(resource) else {
            continue;
        };
        if !force && !records.all(resource).await?.is_empty() {
            info!(resource = %resource, "collection not empty, leaving as is");
            continue;
        }
        let count = samples.len();
        records.replace_all(resource, samples).await?;
        info!(resource = %resource, count, "seeded collection");
        seeded.push((resource, count));
    }
    Ok(seeded)
}

/// Empties every collection.
pub async fn reset(records: &RecordService) -> ApiResult<()> {
    for resource in Resource::all() {
        records.replace_all(resource, Vec::new()).await?;
    }
    info!("all collections cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::reports::dashboard_stats, store::MemoryStore};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn seed_skips_populated_collections_unless_forced() {
        let store = MemoryStore::with_collections([(
            Resource::Requests,
            vec![json!({"id": "REQ900"})],
        )]);
        let records = RecordService::new(Arc::new(store));

        let seeded = seed(&records, false).await.unwrap();
        assert!(seeded.iter().all(|(resource, _)| *resource != Resource::Requests));
        assert_eq!(records.all(Resource::Requests).await.unwrap().len(), 1);

        let seeded = seed(&records, true).await.unwrap();
        assert!(seeded.contains(&(Resource::Requests, 2)));
        assert_eq!(
            records.all(Resource::Requests).await.unwrap()[0]["id"],
            "REQ001"
        );
    }

    #[tokio::test]
    async fn seeded_data_feeds_the_dashboard() {
        let records = RecordService::new(Arc::new(MemoryStore::new()));
        seed(&records, false).await.unwrap();

        let stats = dashboard_stats(
            &records.all(Resource::Requests).await.unwrap(),
            &records.all(Resource::ReceivedItems).await.unwrap(),
            &records.all(Resource::IssuedItems).await.unwrap(),
            &records.all(Resource::StockItems).await.unwrap(),
            &records.all(Resource::SterilizationProcesses).await.unwrap(),
        );
        assert_eq!(stats.active_requests, 1);
        assert_eq!(stats.sterilization_in_progress, 1);
        assert_eq!(stats.items_ready, 1);
        assert_eq!(stats.low_stock_items, 1);
        assert_eq!(stats.total_issued, 1);
    }

    #[tokio::test]
    async fn reset_empties_everything() {
        let records = RecordService::new(Arc::new(MemoryStore::new()));
        seed(&records, true).await.unwrap();
        reset(&records).await.unwrap();
        for resource in Resource::all() {
            assert!(records.all(resource).await.unwrap().is_empty());
        }
    }
}
