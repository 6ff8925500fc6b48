pub mod bulk;
pub mod health;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /bulk/rooms                      ROOM master ingest (POST)
/// /bulk/plans                      PLAN master ingest (POST)
/// /bulk/prices                     PRICE differential ingest (POST)
/// /bulk/stocks                     STOCK differential ingest (POST)
/// /bulk/activity-logs              list activity logs (GET)
/// /bulk/activity-logs/{id}         activity log detail (GET)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new().nest("/bulk", bulk::router(config.max_bulk_body_bytes))
}
