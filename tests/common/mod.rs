#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use cssd_api::{
    build_router, config::AppConfig, resources::Resource, store::FileStore, AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper harness running the full router over a throwaway data directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub store: FileStore,
    dir: TempDir,
}

impl TestApp {
    /// Fresh application with every collection initialised to `[]`.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Fresh application after `adjust` has tweaked the default configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp data dir");
        let mut cfg = AppConfig::with_data_dir(dir.path());
        adjust(&mut cfg);

        let store = FileStore::new(cfg.data_dir.clone());
        store.init().await.expect("failed to initialise data files");

        let state = AppState::from_config(cfg);
        let router = build_router(state.clone());
        Self {
            router,
            state,
            store,
            dir,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn path_for(&self, resource: Resource) -> PathBuf {
        self.store.path_for(resource)
    }

    /// Overwrites a collection file with `records`.
    pub fn write_collection(&self, resource: Resource, records: Value) {
        let raw = serde_json::to_vec_pretty(&records).expect("serialize fixture");
        std::fs::write(self.path_for(resource), raw).expect("write fixture");
    }

    /// Writes raw bytes into a collection file.
    pub fn write_raw(&self, resource: Resource, raw: &str) {
        std::fs::write(self.path_for(resource), raw).expect("write raw fixture");
    }

    /// Current contents of a collection file.
    pub fn read_collection(&self, resource: Resource) -> Value {
        let raw = std::fs::read(self.path_for(resource)).expect("read collection");
        serde_json::from_slice(&raw).expect("collection is JSON")
    }

    pub fn remove_collection(&self, resource: Resource) {
        std::fs::remove_file(self.path_for(resource)).expect("remove collection");
    }

    /// Send a request with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(&value).expect("serialize body")),
            None => Body::empty(),
        };
        self.send(method, uri, body).await
    }

    /// Send a request whose body is exactly `raw`.
    pub async fn request_raw(&self, method: Method, uri: &str, raw: impl Into<Body>) -> Response {
        self.send(method, uri, raw.into()).await
    }

    async fn send(&self, method: Method, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .expect("failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
