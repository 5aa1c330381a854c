//! In-memory filtering for collection listings.

use serde::Deserialize;
use serde_json::Value;

use crate::resources::Resource;

/// Optional filters accepted by `GET /api/<resource>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilter {
    /// Case-insensitive substring over the resource's search fields.
    pub q: Option<String>,
    /// Exact status tag; `all` disables the filter.
    pub status: Option<String>,
    /// Exact priority; `all` disables the filter.
    pub priority: Option<String>,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        active(&self.q).is_none()
            && exact(&self.status).is_none()
            && exact(&self.priority).is_none()
    }

    pub fn matches(&self, resource: Resource, record: &Value) -> bool {
        if let Some(query) = active(&self.q) {
            if !matches_query(resource, record, query) {
                return false;
            }
        }
        if let Some(status) = exact(&self.status) {
            if field_str(record, resource.status_field()) != Some(status) {
                return false;
            }
        }
        if let Some(priority) = exact(&self.priority) {
            if field_str(record, "priority") != Some(priority) {
                return false;
            }
        }
        true
    }

    /// Keeps matching records in their stored order.
    pub fn apply(&self, resource: Resource, records: Vec<Value>) -> Vec<Value> {
        if self.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|record| self.matches(resource, record))
            .collect()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn exact(value: &Option<String>) -> Option<&str> {
    active(value).filter(|v| !v.eq_ignore_ascii_case("all"))
}

pub fn field_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

fn matches_query(resource: Resource, record: &Value, query: &str) -> bool {
    let needle = query.to_lowercase();
    let fields = resource.search_fields();

    if fields.is_empty() {
        record
            .as_object()
            .map(|object| {
                object
                    .values()
                    .filter_map(Value::as_str)
                    .any(|text| text.to_lowercase().contains(&needle))
            })
            .unwrap_or(false)
    } else {
        fields
            .iter()
            .filter_map(|field| field_str(record, field))
            .any(|text| text.to_lowercase().contains(&needle))
    }
}
