//! Activity-log store: the audit trail of bulk jobs.
//!
//! Each record is written by exactly two call sites over its lifetime:
//! [`ActivityLogStore::open`] in the accepting request and
//! [`ActivityLogStore::close`] in the background job.

mod memory;
mod postgres;

use async_trait::async_trait;
use innkeep_core::types::{DbId, Timestamp};
use innkeep_db::models::bulk_activity_log::{
    BulkActivityLog, BulkActivityLogFilter, CreateBulkActivityLog,
};

use crate::error::StoreError;

pub use memory::MemoryActivityLogStore;
pub use postgres::PgActivityLogStore;

#[async_trait]
pub trait ActivityLogStore: Send + Sync {
    /// Open a record for an accepted batch and return its id.
    async fn open(&self, input: &CreateBulkActivityLog) -> Result<DbId, StoreError>;

    /// Close an open record with the job's outcome.
    ///
    /// `Ok(None)` means no open record matched; callers treat that as a
    /// reportable anomaly, not an error.
    async fn close(
        &self,
        id: DbId,
        started_at: Timestamp,
        succeeded: bool,
        error_message: &str,
    ) -> Result<Option<BulkActivityLog>, StoreError>;

    async fn find(&self, id: DbId) -> Result<Option<BulkActivityLog>, StoreError>;

    /// Records matching `filter`, newest first.
    async fn list(&self, filter: &BulkActivityLogFilter) -> Result<Vec<BulkActivityLog>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    /// Cheap reachability probe for health reporting.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
