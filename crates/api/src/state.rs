use std::sync::Arc;

use innkeep_pipeline::BulkIngestionPipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Bulk ingestion pipeline; also owns the activity-log store.
    pub pipeline: Arc<BulkIngestionPipeline>,
}
