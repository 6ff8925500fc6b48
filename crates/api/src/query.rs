//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /bulk/activity-logs`.
///
/// `service_kind` is matched against the stored upper-case value
/// (`ROOM`, `PLAN`, `PRICE`, `STOCK`). Values of `limit` and `offset` are
/// clamped by the handler via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityLogListParams {
    pub service_kind: Option<String>,
    pub is_success: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
