use async_trait::async_trait;
use chrono::Utc;
use innkeep_core::types::{DbId, Timestamp};
use innkeep_db::models::bulk_activity_log::{
    BulkActivityLog, BulkActivityLogFilter, CreateBulkActivityLog,
};
use innkeep_db::repositories::BulkActivityLogRepo;
use innkeep_db::DbPool;

use super::ActivityLogStore;
use crate::error::StoreError;

/// [`ActivityLogStore`] backed by the `bulk_activity_logs` table.
#[derive(Debug, Clone)]
pub struct PgActivityLogStore {
    pool: DbPool,
}

impl PgActivityLogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogStore for PgActivityLogStore {
    async fn open(&self, input: &CreateBulkActivityLog) -> Result<DbId, StoreError> {
        let log = BulkActivityLogRepo::create(&self.pool, input).await?;
        Ok(log.id)
    }

    async fn close(
        &self,
        id: DbId,
        started_at: Timestamp,
        succeeded: bool,
        error_message: &str,
    ) -> Result<Option<BulkActivityLog>, StoreError> {
        let closed =
            BulkActivityLogRepo::close(&self.pool, id, started_at, Utc::now(), succeeded, error_message)
                .await?;
        Ok(closed)
    }

    async fn find(&self, id: DbId) -> Result<Option<BulkActivityLog>, StoreError> {
        Ok(BulkActivityLogRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list(&self, filter: &BulkActivityLogFilter) -> Result<Vec<BulkActivityLog>, StoreError> {
        Ok(BulkActivityLogRepo::list(&self.pool, filter).await?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(BulkActivityLogRepo::count(&self.pool).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(innkeep_db::health_check(&self.pool).await?)
    }
}
