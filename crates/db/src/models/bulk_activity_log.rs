//! Bulk activity log models and DTOs.
//!
//! Defines the database row struct for `bulk_activity_logs`, the create DTO
//! used when a batch is accepted, and the list filter.

use innkeep_core::activity_log::ActivityStatus;
use innkeep_core::bulk::{ChangeType, ServiceKind, Wholesaler};
use innkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `bulk_activity_logs` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BulkActivityLog {
    pub id: DbId,
    pub service_kind: String,
    pub change_type: String,
    pub wholesaler_id: i16,
    pub host_url: String,
    pub row_count: i32,
    pub process_start_at: Timestamp,
    pub process_end_at: Option<Timestamp>,
    pub duration_seconds: Option<f64>,
    pub is_success: Option<bool>,
    pub error_message: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BulkActivityLog {
    pub fn status(&self) -> ActivityStatus {
        ActivityStatus::from_is_success(self.is_success)
    }

    pub fn is_open(&self) -> bool {
        self.process_end_at.is_none()
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for opening a record when a batch is accepted.
#[derive(Debug, Clone)]
pub struct CreateBulkActivityLog {
    pub service_kind: ServiceKind,
    pub change_type: ChangeType,
    pub wholesaler: Wholesaler,
    pub host_url: String,
    pub row_count: i32,
    pub started_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Filter for listing activity logs, newest first.
///
/// `limit` and `offset` are expected to be clamped by the caller.
#[derive(Debug, Clone, Default)]
pub struct BulkActivityLogFilter {
    pub service_kind: Option<ServiceKind>,
    pub is_success: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}
