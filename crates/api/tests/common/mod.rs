//! Shared helpers for API integration tests.
//!
//! The app is built with the production router and middleware stack, but
//! with the in-memory activity-log store and a stub processor so no
//! database is needed.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use innkeep_api::config::ServerConfig;
use innkeep_api::router::build_app_router;
use innkeep_api::state::AppState;
use innkeep_core::bulk::BulkBatch;
use innkeep_pipeline::{
    BulkIngestionPipeline, DomainProcessor, MemoryActivityLogStore, ProcessError,
    WholesalerRouter,
};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_bulk_body_bytes: 64 * 1024,
        database_max_connections: 1,
    }
}

/// Processor that accepts every batch.
pub struct AcceptAll;

#[async_trait]
impl DomainProcessor for AcceptAll {
    async fn apply(&self, _batch: &BulkBatch) -> Result<(), ProcessError> {
        Ok(())
    }
}

/// Processor that rejects every batch with a fixed message.
pub struct RejectAll(pub &'static str);

#[async_trait]
impl DomainProcessor for RejectAll {
    async fn apply(&self, _batch: &BulkBatch) -> Result<(), ProcessError> {
        Err(ProcessError::rejected(self.0))
    }
}

/// Handles a test keeps to inspect background effects.
pub struct TestApp {
    pub router: Router,
    pub pipeline: Arc<BulkIngestionPipeline>,
    pub store: Arc<MemoryActivityLogStore>,
}

/// Build the full application with every supported route wired to
/// `processor`.
pub fn build_test_app_with(processor: Arc<dyn DomainProcessor>) -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryActivityLogStore::new());
    let routes = WholesalerRouter::supported(|_, _| Arc::clone(&processor));
    let pipeline = Arc::new(BulkIngestionPipeline::new(routes, store.clone()));

    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline: Arc::clone(&pipeline),
    };

    TestApp {
        router: build_app_router(state, &config),
        pipeline,
        store,
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(AcceptAll))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a raw body with an optional `x-wholesaler-id` header.
pub async fn post_raw(
    app: Router,
    uri: &str,
    wholesaler: Option<&str>,
    body: impl Into<Body>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("host", "feeds.example.test")
        .header("content-type", "application/json");
    if let Some(wholesaler) = wholesaler {
        builder = builder.header("x-wholesaler-id", wholesaler);
    }
    app.oneshot(builder.body(body.into()).unwrap()).await.unwrap()
}

pub async fn post_json(
    app: Router,
    uri: &str,
    wholesaler: Option<&str>,
    body: &serde_json::Value,
) -> Response<Body> {
    post_raw(app, uri, wholesaler, serde_json::to_vec(body).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
