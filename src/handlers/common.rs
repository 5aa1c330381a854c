use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{ApiResult, ServiceError};

const INVALID_BODY: &str = "Invalid JSON body.";

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Parses a request body the way the dashboard sends it: empty means `{}`,
/// otherwise it must be a JSON object or array.
pub fn parse_json_body(body: &Bytes) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
        _ => Err(ServiceError::BadRequest(INVALID_BODY.to_string())),
    }
}

/// The `status` member of a status-change body.
pub fn status_from_body(body: &Value) -> ApiResult<&str> {
    body.get("status").and_then(Value::as_str).ok_or_else(|| {
        ServiceError::ValidationError("Body must contain a string 'status'.".to_string())
    })
}
