/*!
 * # Reports
 *
 * Read-only aggregates over the collections: dashboard counters, surgery
 * consumption totals and the stock position. All of them are plain
 * reductions over whole arrays.
 */

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument, warn};

use crate::{
    errors::{ApiResult, ServiceError},
    models::{
        records::count_of, ReceiptStatus, RequestStatus, SterilizationStatus, StockStatus,
        SurgeryReport,
    },
    resources::Resource,
    services::{records::RecordService, search::field_str},
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_requests: usize,
    pub sterilization_in_progress: usize,
    pub items_ready: usize,
    pub low_stock_items: usize,
    pub total_requests: usize,
    pub total_received: usize,
    pub total_issued: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumptionQuery {
    pub department: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentConsumption {
    pub department: String,
    pub surgeries: usize,
    pub consumed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionSummary {
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    pub total_consumption: i64,
    pub total_surgeries: usize,
    pub average_per_surgery: f64,
    pub by_department: Vec<DepartmentConsumption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub total_items: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub in_sterilization: usize,
}

fn has_status(record: &Value, status: impl Into<&'static str>) -> bool {
    field_str(record, "status") == Some(status.into())
}

/// Ids of the stock items an `In Progress` sterilization process points at.
pub fn items_in_sterilization(processes: &[Value]) -> HashSet<&str> {
    processes
        .iter()
        .filter(|process| has_status(process, SterilizationStatus::InProgress))
        .filter_map(|process| field_str(process, "itemId"))
        .collect()
}

pub fn dashboard_stats(
    requests: &[Value],
    received: &[Value],
    issued: &[Value],
    stock: &[Value],
    processes: &[Value],
) -> DashboardStats {
    let count = |records: &[Value], status: &'static str| {
        records
            .iter()
            .filter(|record| field_str(record, "status") == Some(status))
            .count()
    };
    let sterilizing = items_in_sterilization(processes);

    DashboardStats {
        active_requests: count(requests, RequestStatus::Pending.into()),
        sterilization_in_progress: count(requests, RequestStatus::Processing.into()),
        items_ready: count(received, ReceiptStatus::FullyReceived.into()),
        low_stock_items: stock
            .iter()
            .filter(|item| {
                effective_stock_status(item, &sterilizing) == Some(StockStatus::LowStock)
            })
            .count(),
        total_requests: requests.len(),
        total_received: received.len(),
        total_issued: issued.len(),
    }
}

/// Stock status as the dashboard shows it: items being sterilized first,
/// then the stored status, then the status implied by the stock levels.
pub fn effective_stock_status(item: &Value, sterilizing: &HashSet<&str>) -> Option<StockStatus> {
    if let Some(id) = field_str(item, "id") {
        if sterilizing.contains(id) {
            return Some(StockStatus::InSterilization);
        }
    }

    let stored = field_str(item, "status").and_then(|status| status.parse::<StockStatus>().ok());
    if stored.is_some() {
        return stored;
    }

    let quantity = item.get("quantity").and_then(count_of)?;
    let min_quantity = item.get("minQuantity").and_then(count_of)?;
    Some(StockStatus::from_levels(quantity, min_quantity))
}

pub fn stock_summary(stock: &[Value], processes: &[Value]) -> StockSummary {
    let sterilizing = items_in_sterilization(processes);

    let mut summary = StockSummary {
        total_items: stock.len(),
        ..Default::default()
    };
    for item in stock {
        match effective_stock_status(item, &sterilizing) {
            Some(StockStatus::InStock) => summary.in_stock += 1,
            Some(StockStatus::LowStock) => summary.low_stock += 1,
            Some(StockStatus::OutOfStock) => summary.out_of_stock += 1,
            Some(StockStatus::InSterilization) => summary.in_sterilization += 1,
            None => {}
        }
    }
    summary
}

fn parse_date(label: &str, value: &Option<String>) -> ApiResult<Option<NaiveDate>> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ServiceError::BadRequest(format!(
                    "Invalid '{}' date '{}', expected YYYY-MM-DD.",
                    label, raw
                ))
            }),
    }
}

/// Reads a stored surgery report. Fields of the wrong type load as empty
/// rather than dropping the record; entries that are not objects are skipped.
fn surgery_report(record: &Value) -> Option<SurgeryReport> {
    if !record.is_object() {
        debug!("skipping non-object consumption record");
        return None;
    }
    match serde_json::from_value(record.clone()) {
        Ok(report) => Some(report),
        Err(err) => {
            warn!(error = %err, "unreadable consumption record counted as empty");
            Some(SurgeryReport::default())
        }
    }
}

pub fn consumption_summary(
    records: &[Value],
    query: &ConsumptionQuery,
) -> ApiResult<ConsumptionSummary> {
    let from = parse_date("from", &query.from)?;
    let to = parse_date("to", &query.to)?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ServiceError::BadRequest(
                "'from' must not be after 'to'.".to_string(),
            ));
        }
    }
    let department = query
        .department
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("all"));

    let reports: Vec<SurgeryReport> = records
        .iter()
        .filter_map(surgery_report)
        .filter(|report| department.map_or(true, |d| report.department == d))
        .filter(|report| {
            if from.is_none() && to.is_none() {
                return true;
            }
            match NaiveDate::parse_from_str(report.date.trim(), "%Y-%m-%d") {
                Ok(date) => from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t),
                Err(_) => false,
            }
        })
        .collect();

    let mut by_department: BTreeMap<String, DepartmentConsumption> = BTreeMap::new();
    let mut total_consumption: i64 = 0;
    for report in &reports {
        let consumed = report.total_consumed();
        total_consumption = total_consumption.saturating_add(consumed);

        let entry = by_department
            .entry(report.department.clone())
            .or_insert_with(|| DepartmentConsumption {
                department: report.department.clone(),
                surgeries: 0,
                consumed: 0,
            });
        entry.surgeries += 1;
        entry.consumed = entry.consumed.saturating_add(consumed);
    }

    let total_surgeries = reports.len();
    let average_per_surgery = if total_surgeries == 0 {
        0.0
    } else {
        (total_consumption as f64 / total_surgeries as f64 * 10.0).round() / 10.0
    };

    Ok(ConsumptionSummary {
        department: department.unwrap_or("all").to_string(),
        from,
        to,
        total_consumption,
        total_surgeries,
        average_per_surgery,
        by_department: by_department.into_values().collect(),
    })
}

#[derive(Clone)]
pub struct ReportService {
    records: RecordService,
}

impl ReportService {
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> ApiResult<DashboardStats> {
        let (requests, received, issued, stock, processes) = futures::try_join!(
            self.records.all(Resource::Requests),
            self.records.all(Resource::ReceivedItems),
            self.records.all(Resource::IssuedItems),
            self.records.all(Resource::StockItems),
            self.records.all(Resource::SterilizationProcesses),
        )?;
        let stats = dashboard_stats(&requests, &received, &issued, &stock, &processes);
        debug!(?stats, "dashboard stats computed");
        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn consumption(&self, query: &ConsumptionQuery) -> ApiResult<ConsumptionSummary> {
        let records = self.records.all(Resource::ConsumptionReports).await?;
        consumption_summary(&records, query)
    }

    #[instrument(skip(self))]
    pub async fn stock(&self) -> ApiResult<StockSummary> {
        let (stock, processes) = futures::try_join!(
            self.records.all(Resource::StockItems),
            self.records.all(Resource::SterilizationProcesses),
        )?;
        Ok(stock_summary(&stock, &processes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn surgeries() -> Vec<Value> {
        let surgery = |id: &str, department: &str, date: &str, before: i64, after: i64| {
            json!({
                "id": id,
                "department": department,
                "date": date,
                "beforeCount": before,
                "afterCount": after,
                "consumed": before - after,
            })
        };
        vec![
            surgery("SURG001", "OR-1", "2024-06-10", 25, 18),
            surgery("SURG002", "OR-2", "2024-06-10", 15, 12),
            surgery("SURG003", "OR-1", "2024-06-09", 20, 17),
        ]
    }

    #[test]
    fn dashboard_counts_by_status() {
        let requests = vec![
            json!({"id": "REQ001", "status": "Pending"}),
            json!({"id": "REQ002", "status": "Processing"}),
            json!({"id": "REQ003", "status": "Pending"}),
        ];
        let received = vec![
            json!({"id": "REC001", "status": "Fully Received"}),
            json!({"id": "REC002", "status": "Partially Received"}),
        ];
        let issued = vec![json!({"id": "ISS001", "status": "Issued"})];
        let stock = vec![
            json!({"id": "STK001", "quantity": 500, "minQuantity": 100, "status": "In Stock"}),
            json!({"id": "STK002", "quantity": 50, "minQuantity": 100, "status": "In Stock"}),
            json!({"id": "STK003", "status": "Low Stock"}),
            json!({"id": "STK004", "quantity": 5, "minQuantity": 100}),
            json!({"id": "STK005", "status": "Low Stock"}),
        ];
        let processes = vec![json!({"id": "STE001", "itemId": "STK005", "status": "In Progress"})];

        let stats = dashboard_stats(&requests, &received, &issued, &stock, &processes);
        assert_eq!(
            stats,
            DashboardStats {
                active_requests: 2,
                sterilization_in_progress: 1,
                items_ready: 1,
                low_stock_items: 2,
                total_requests: 3,
                total_received: 2,
                total_issued: 1,
            }
        );
    }

    #[test]
    fn consumption_totals_and_average() {
        let summary = consumption_summary(&surgeries(), &ConsumptionQuery::default()).unwrap();
        assert_eq!(summary.total_consumption, 13);
        assert_eq!(summary.total_surgeries, 3);
        assert_eq!(summary.average_per_surgery, 4.3);
        assert_eq!(summary.department, "all");
        assert_eq!(
            summary.by_department,
            vec![
                DepartmentConsumption {
                    department: "OR-1".into(),
                    surgeries: 2,
                    consumed: 10
                },
                DepartmentConsumption {
                    department: "OR-2".into(),
                    surgeries: 1,
                    consumed: 3
                },
            ]
        );
    }

    #[test]
    fn consumption_filters_by_department_and_dates() {
        let query = ConsumptionQuery {
            department: Some("OR-1".into()),
            from: Some("2024-06-10".into()),
            to: Some("2024-06-10".into()),
        };
        let summary = consumption_summary(&surgeries(), &query).unwrap();
        assert_eq!(summary.total_surgeries, 1);
        assert_eq!(summary.total_consumption, 7);
    }

    #[test]
    fn empty_consumption_averages_to_zero() {
        let summary = consumption_summary(&[], &ConsumptionQuery::default()).unwrap();
        assert_eq!(summary.average_per_surgery, 0.0);
        assert!(summary.by_department.is_empty());
    }

    #[test]
    fn bad_date_ranges_are_rejected() {
        let malformed = ConsumptionQuery {
            from: Some("10/06/2024".into()),
            ..Default::default()
        };
        assert_matches!(
            consumption_summary(&surgeries(), &malformed),
            Err(ServiceError::BadRequest(_))
        );

        let inverted = ConsumptionQuery {
            from: Some("2024-06-11".into()),
            to: Some("2024-06-01".into()),
            ..Default::default()
        };
        assert_matches!(
            consumption_summary(&surgeries(), &inverted),
            Err(ServiceError::BadRequest(_))
        );
    }

    #[test]
    fn stock_summary_marks_items_in_sterilization() {
        let stock = vec![
            json!({"id": "STK001", "quantity": 500, "minQuantity": 100}),
            json!({"id": "STK002", "quantity": 50, "minQuantity": 100}),
            json!({"id": "STK003", "quantity": 0, "minQuantity": 10}),
            json!({"id": "STK004", "quantity": 40, "minQuantity": 10}),
            json!({"id": "STK005", "status": "Discontinued"}),
        ];
        let processes = vec![
            json!({"id": "STE001", "itemId": "STK004", "status": "In Progress"}),
            json!({"id": "STE002", "itemId": "STK001", "status": "Completed"}),
        ];
        assert_eq!(
            stock_summary(&stock, &processes),
            StockSummary {
                total_items: 5,
                in_stock: 1,
                low_stock: 1,
                out_of_stock: 1,
                in_sterilization: 1,
            }
        );
    }

    #[test]
    fn stored_stock_status_wins_over_levels() {
        let none = HashSet::new();
        let marked_low =
            json!({"id": "STK001", "quantity": 500, "minQuantity": 100, "status": "Low Stock"});
        let unmarked = json!({"id": "STK002", "quantity": "0", "minQuantity": 10});
        assert_eq!(effective_stock_status(&marked_low, &none), Some(StockStatus::LowStock));
        assert_eq!(effective_stock_status(&unmarked, &none), Some(StockStatus::OutOfStock));
        assert_eq!(effective_stock_status(&json!({"id": "STK003"}), &none), None);
    }

    #[test]
    fn dashboard_and_stock_summary_agree_on_low_stock() {
        let stock = vec![
            json!({"id": "STK001", "quantity": 500, "minQuantity": 100, "status": "Low Stock"}),
            json!({"id": "STK002", "quantity": 50, "minQuantity": 100, "status": "Low Stock"}),
        ];
        let processes = vec![json!({"id": "STE001", "itemId": "STK002", "status": "In Progress"})];

        let stats = dashboard_stats(&[], &[], &[], &stock, &processes);
        let summary = stock_summary(&stock, &processes);
        assert_eq!(stats.low_stock_items, 1);
        assert_eq!(summary.low_stock, stats.low_stock_items);
        assert_eq!(summary.in_stock, 0);
        assert_eq!(summary.in_sterilization, 1);
    }

    #[test]
    fn mistyped_consumption_records_still_count() {
        let records = vec![
            json!({"id": "SURG001", "department": "OR-1", "date": "2024-06-10", "consumed": 7}),
            json!({"id": "SURG002", "department": "OR-1", "date": null, "consumed": 3}),
            json!({"id": "SURG003", "department": "OR-2", "date": "2024-06-11", "consumed": 2.5}),
            json!({"id": "SURG004", "department": "OR-2", "beforeCount": "20", "afterCount": 18}),
            json!("not a report"),
        ];
        let summary = consumption_summary(&records, &ConsumptionQuery::default()).unwrap();
        assert_eq!(summary.total_surgeries, 4);
        assert_eq!(summary.total_consumption, 13);
        assert_eq!(summary.by_department[1].consumed, 3);
    }

    #[test]
    fn huge_consumption_saturates() {
        let records = vec![
            json!({"id": "SURG001", "department": "OR-1", "consumed": i64::MAX}),
            json!({"id": "SURG002", "department": "OR-1", "consumed": 1}),
        ];
        let summary = consumption_summary(&records, &ConsumptionQuery::default()).unwrap();
        assert_eq!(summary.total_consumption, i64::MAX);
        assert_eq!(summary.by_department[0].consumed, i64::MAX);
        assert_eq!(summary.by_department[0].surgeries, 2);
    }
}
