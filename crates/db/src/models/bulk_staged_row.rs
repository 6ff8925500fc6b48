//! Staged wholesaler rows (`bulk_staged_rows`).

use innkeep_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `bulk_staged_rows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BulkStagedRow {
    pub id: DbId,
    pub wholesaler_id: i16,
    pub service_kind: String,
    pub property_code: String,
    pub entity_key: String,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One validated row ready to be landed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStagedRow {
    pub property_code: String,
    pub entity_key: String,
    pub payload: serde_json::Value,
}
