use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};

use super::common::success_response;
use crate::{errors::ApiResult, services::reports::ConsumptionQuery, AppState};

/// Dashboard counters, mounted at `/api/dashboard`.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}

/// Aggregate reports, mounted at `/api/reports`.
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/consumption", get(consumption_report))
        .route("/stock", get(stock_report))
}

async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Response> {
    let stats = state.reports.dashboard().await?;
    Ok(success_response(stats))
}

async fn consumption_report(
    State(state): State<AppState>,
    Query(query): Query<ConsumptionQuery>,
) -> ApiResult<Response> {
    let summary = state.reports.consumption(&query).await?;
    Ok(success_response(summary))
}

async fn stock_report(State(state): State<AppState>) -> ApiResult<Response> {
    let summary = state.reports.stock().await?;
    Ok(success_response(summary))
}
