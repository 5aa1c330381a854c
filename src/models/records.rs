//! Typed shapes of the records kept in each collection.
//!
//! The REST layer stores whatever JSON it is given; these structs describe
//! the fields the dashboard writes and are what seeding and reporting read.
//! Optional fields default so partially filled records still parse.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::{
    IssueStatus, KitStatus, Priority, ProcessType, ReceiptStatus, RequestStatus,
    SterilizationStatus, StockStatus, WorkflowStage,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssdRequest {
    pub id: String,
    pub department: String,
    pub priority: Priority,
    pub items: String,
    pub quantity: i64,
    pub status: RequestStatus,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedItem {
    pub id: String,
    pub request_id: String,
    pub department: String,
    pub items: String,
    pub quantity: i64,
    pub received_quantity: i64,
    pub status: ReceiptStatus,
    pub received_at: String,
    pub received_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedItem {
    pub id: String,
    pub request_id: String,
    pub department: String,
    pub items: String,
    pub quantity: i64,
    pub issued_time: String,
    pub issued_date: String,
    pub status: IssueStatus,
    pub outlet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageKit {
    pub id: String,
    pub name: String,
    pub items: Vec<String>,
    pub department: String,
    pub priority: Priority,
    pub status: KitStatus,
    pub quantity: i64,
    pub creation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub unit: String,
    pub last_updated: String,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SterilizationProcess {
    pub id: String,
    /// Request or stock item being processed.
    pub item_id: String,
    pub machine: String,
    pub process_type: ProcessType,
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    pub status: SterilizationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

/// Lenient readers for hand-entered records: `null`, numbers written as
/// strings and fractional counts all load instead of failing the record.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::ItemUsage;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => String::new(),
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(super::count_of(&Value::deserialize(deserializer)?).unwrap_or(0))
    }

    pub fn optional_count<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Ok(super::count_of(&Value::deserialize(deserializer)?))
    }

    pub fn items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ItemUsage>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}

/// Whole-unit count held in a JSON value. Fractions round, out-of-range
/// values saturate, numeric strings parse; anything else is `None`.
pub fn count_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|_| i64::MAX))
            .or_else(|| number.as_f64().map(|f| f.round() as i64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            })
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUsage {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity: i64,
}

/// One surgery's instrument consumption, as filed from the surgery report form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgeryReport {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub surgery_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub surgery_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub department: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub before_count: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub after_count: i64,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub consumed: Option<i64>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub items_used: Vec<ItemUsage>,
}

impl SurgeryReport {
    /// Recorded consumption, falling back to the itemized usage.
    pub fn total_consumed(&self) -> i64 {
        self.consumed.unwrap_or_else(|| {
            self.items_used
                .iter()
                .fold(0i64, |total, item| total.saturating_add(item.quantity))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEntry {
    pub id: String,
    pub request_id: String,
    pub kit_id: String,
    pub sterilization_id: String,
    pub current_status: WorkflowStage,
    pub timestamp: String,
    pub location: String,
}
