use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use innkeep_core::activity_log::duration_seconds;
use innkeep_core::types::{DbId, Timestamp};
use innkeep_db::models::bulk_activity_log::{
    BulkActivityLog, BulkActivityLogFilter, CreateBulkActivityLog,
};
use tokio::sync::RwLock;

use super::ActivityLogStore;
use crate::error::StoreError;

/// In-process [`ActivityLogStore`] with the same open/close rules as the
/// Postgres store. Used by tests and database-less local runs.
#[derive(Debug, Default)]
pub struct MemoryActivityLogStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: DbId,
    records: BTreeMap<DbId, BulkActivityLog>,
}

impl MemoryActivityLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, ordered by id.
    pub async fn records(&self) -> Vec<BulkActivityLog> {
        self.inner.read().await.records.values().cloned().collect()
    }
}

#[async_trait]
impl ActivityLogStore for MemoryActivityLogStore {
    async fn open(&self, input: &CreateBulkActivityLog) -> Result<DbId, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();

        inner.records.insert(
            id,
            BulkActivityLog {
                id,
                service_kind: input.service_kind.as_str().to_string(),
                change_type: input.change_type.as_str().to_string(),
                wholesaler_id: input.wholesaler.id(),
                host_url: input.host_url.clone(),
                row_count: input.row_count,
                process_start_at: input.started_at,
                process_end_at: None,
                duration_seconds: None,
                is_success: None,
                error_message: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn close(
        &self,
        id: DbId,
        started_at: Timestamp,
        succeeded: bool,
        error_message: &str,
    ) -> Result<Option<BulkActivityLog>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.records.get_mut(&id).filter(|r| r.is_open()) else {
            return Ok(None);
        };

        let ended_at = Utc::now();
        record.process_end_at = Some(ended_at);
        record.duration_seconds = Some(duration_seconds(started_at, ended_at));
        record.is_success = Some(succeeded);
        record.error_message = error_message.to_string();
        record.updated_at = ended_at;
        Ok(Some(record.clone()))
    }

    async fn find(&self, id: DbId) -> Result<Option<BulkActivityLog>, StoreError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn list(&self, filter: &BulkActivityLogFilter) -> Result<Vec<BulkActivityLog>, StoreError> {
        let inner = self.inner.read().await;
        let mut matched: Vec<&BulkActivityLog> = inner
            .records
            .values()
            .filter(|r| {
                filter
                    .service_kind
                    .map_or(true, |kind| r.service_kind == kind.as_str())
            })
            .filter(|r| filter.is_success.is_none() || r.is_success == filter.is_success)
            .collect();

        matched.sort_by(|a, b| {
            b.process_start_at
                .cmp(&a.process_start_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(matched
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(0))
            .take(usize::try_from(filter.limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let len = self.inner.read().await.records.len();
        Ok(i64::try_from(len).unwrap_or(i64::MAX))
    }
}
