//! Route definitions for bulk ingestion and its activity logs.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bulk;
use crate::state::AppState;

/// Bulk routes mounted at `/bulk`.
///
/// The body limit applies to the ingest routes only.
///
/// ```text
/// POST /rooms                  -> ingest_rooms
/// POST /plans                  -> ingest_plans
/// POST /prices                 -> ingest_prices
/// POST /stocks                 -> ingest_stocks
/// GET  /activity-logs          -> list_activity_logs
/// GET  /activity-logs/{id}     -> get_activity_log
/// ```
pub fn router(max_body_bytes: usize) -> Router<AppState> {
    let ingest = Router::new()
        .route("/rooms", post(bulk::ingest_rooms))
        .route("/plans", post(bulk::ingest_plans))
        .route("/prices", post(bulk::ingest_prices))
        .route("/stocks", post(bulk::ingest_stocks))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    Router::new()
        .merge(ingest)
        .route("/activity-logs", get(bulk::list_activity_logs))
        .route("/activity-logs/{id}", get(bulk::get_activity_log))
}
