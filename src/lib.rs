//! CSSD API Library
//!
//! JSON-file backed REST service for a Central Sterile Services Department:
//! one array-valued collection per resource, generic CRUD over each, plus
//! status transitions and read-only reports.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod resources;
pub mod services;
pub mod store;
pub mod tracing;

use axum::{extract::DefaultBodyLimit, Router};
use http::HeaderValue;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    config::AppConfig,
    resources::Resource,
    services::{RecordService, ReportService, StatusService},
    store::{FileStore, MemoryStore, ResourceStore},
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub records: RecordService,
    pub status: StatusService,
    pub reports: ReportService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ResourceStore>) -> Self {
        let records = RecordService::new(store).with_id_assignment(config.assign_missing_ids);
        Self {
            status: StatusService::new(records.clone()),
            reports: ReportService::new(records.clone()),
            records,
            config: Arc::new(config),
        }
    }

    /// State backed by the store the configuration selects.
    pub fn from_config(config: AppConfig) -> Self {
        let store = build_store(&config);
        Self::new(config, store)
    }
}

/// The configured storage backend.
pub fn build_store(config: &AppConfig) -> Arc<dyn ResourceStore> {
    if config.uses_memory_store() {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(config.data_dir.clone()))
    }
}

/// CORS is open to any origin unless origins are configured.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// API routes without the outer middleware stack.
pub fn api_routes() -> Router<AppState> {
    let mut router = Router::new()
        .merge(handlers::health::health_routes())
        .nest("/api/dashboard", handlers::reports::dashboard_routes())
        .nest("/api/reports", handlers::reports::report_routes());

    for resource in Resource::all() {
        router = router.nest(
            &format!("/api/{}", resource.name()),
            handlers::resources::resource_routes(resource),
        );
    }
    router
}

/// Full application: routes, body limit, CORS, HTTP tracing and request ids.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_size;
    let cors = cors_layer(&state.config);

    api_routes()
        .layer(DefaultBodyLimit::max(body_limit))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
