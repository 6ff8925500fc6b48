//! Handlers for bulk ingestion and activity-log inspection.
//!
//! The four ingest endpoints are thin: they lift the wholesaler header,
//! the request host and the raw body into an [`IngestRequest`] and hand it
//! to the pipeline. Everything after acceptance happens in the background.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, Uri};
use axum::Json;
use innkeep_core::bulk::ServiceKind;
use innkeep_core::error::CoreError;
use innkeep_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use innkeep_core::types::DbId;
use innkeep_db::models::bulk_activity_log::{BulkActivityLog, BulkActivityLogFilter};
use innkeep_pipeline::{AcceptanceReceipt, ActivityLogStore, IngestRequest};

use crate::error::{AppError, AppResult};
use crate::query::ActivityLogListParams;
use crate::response::{AcceptedResponse, DataResponse};
use crate::state::AppState;

/// Header naming the wholesaler that sent the batch.
pub const WHOLESALER_HEADER: &str = "x-wholesaler-id";

type Accepted = Json<AcceptedResponse<AcceptanceReceipt>>;

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

/// POST /bulk/rooms
pub async fn ingest_rooms(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Accepted> {
    ingest(&state, ServiceKind::Room, &uri, &headers, &body).await
}

/// POST /bulk/plans
pub async fn ingest_plans(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Accepted> {
    ingest(&state, ServiceKind::Plan, &uri, &headers, &body).await
}

/// POST /bulk/prices
pub async fn ingest_prices(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Accepted> {
    ingest(&state, ServiceKind::Price, &uri, &headers, &body).await
}

/// POST /bulk/stocks
pub async fn ingest_stocks(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Accepted> {
    ingest(&state, ServiceKind::Stock, &uri, &headers, &body).await
}

async fn ingest(
    state: &AppState,
    service_kind: ServiceKind,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> AppResult<Accepted> {
    // A non-UTF-8 header value cannot name a wholesaler.
    let wholesaler_header = headers
        .get(WHOLESALER_HEADER)
        .map(|v| v.to_str().unwrap_or_default());
    // HTTP/2 carries the host as the `:authority` pseudo-header, which
    // lands in the URI rather than the header map.
    let host_url = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or_default();

    let receipt = state
        .pipeline
        .accept(IngestRequest {
            service_kind,
            wholesaler_header,
            host_url,
            body,
        })
        .await
        .inspect_err(|e| {
            tracing::debug!(%service_kind, error = %e, "Bulk batch rejected");
        })?;

    Ok(Json(AcceptedResponse::new(receipt)))
}

// ---------------------------------------------------------------------------
// Activity logs
// ---------------------------------------------------------------------------

/// GET /bulk/activity-logs
///
/// Newest first, optionally filtered by domain and outcome.
pub async fn list_activity_logs(
    State(state): State<AppState>,
    Query(params): Query<ActivityLogListParams>,
) -> AppResult<Json<DataResponse<Vec<BulkActivityLog>>>> {
    let service_kind = params
        .service_kind
        .as_deref()
        .map(|s| ServiceKind::from_str_value(&s.to_ascii_uppercase()))
        .transpose()
        .map_err(AppError::BadRequest)?;

    let filter = BulkActivityLogFilter {
        service_kind,
        is_success: params.is_success,
        limit: clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
        offset: clamp_offset(params.offset),
    };

    let logs = state.pipeline.store().list(&filter).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// GET /bulk/activity-logs/{id}
pub async fn get_activity_log(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BulkActivityLog>>> {
    let log = state
        .pipeline
        .store()
        .find(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "BulkActivityLog",
            id,
        })?;
    Ok(Json(DataResponse { data: log }))
}
