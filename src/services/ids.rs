//! Sequential, prefix-based record ids (`REQ001`, `STK014`, ...).

use serde_json::Value;

const ID_WIDTH: usize = 3;

/// Next id for `prefix`: one past the largest numeric suffix among existing
/// ids carrying that prefix. Gaps left by deletions are never reused.
pub fn next_sequential_id(prefix: &str, records: &[Value]) -> String {
    let highest = records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_str))
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    format!("{}{:0width$}", prefix, highest + 1, width = ID_WIDTH)
}
