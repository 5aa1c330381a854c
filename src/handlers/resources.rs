//! Generic REST handlers shared by every collection.
//!
//! Each collection gets its own nested router with the [`Resource`] injected
//! as an extension, so routes stay static per collection.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};
use tracing::debug;

use super::common::{created_response, parse_json_body, status_from_body, success_response};
use crate::{errors::ApiResult, resources::Resource, services::search::ListFilter, AppState};

/// Routes for one collection, to be nested at `/api/<name>`.
pub fn resource_routes(resource: Resource) -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/:id", put(update_record).delete(delete_record))
        .route("/:id/status", post(set_record_status));

    if resource == Resource::WorkflowEntries {
        router = router.route("/:id/advance", post(advance_workflow));
    }

    router.layer(Extension(resource))
}

async fn list_records(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Response> {
    let records = state.records.list(resource, &filter).await?;
    debug!(resource = %resource, count = records.len(), "listed records");
    Ok(success_response(records))
}

async fn create_record(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    body: Bytes,
) -> ApiResult<Response> {
    let record = parse_json_body(&body)?;
    let created = state.records.create(resource, record).await?;
    Ok(created_response(created))
}

async fn update_record(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    let patch = parse_json_body(&body)?;
    let updated = state.records.update(resource, &id, &patch).await?;
    Ok(success_response(updated))
}

async fn delete_record(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let removed = state.records.delete(resource, &id).await?;
    Ok(success_response(removed))
}

async fn set_record_status(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    let body = parse_json_body(&body)?;
    let status = status_from_body(&body)?;
    let updated = state.status.set_status(resource, &id, status).await?;
    Ok(success_response(updated))
}

async fn advance_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let advanced = state.status.advance_workflow(&id).await?;
    Ok(success_response(advanced))
}
