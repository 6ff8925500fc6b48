//! Repository for the `bulk_activity_logs` table.

use innkeep_core::activity_log::duration_seconds;
use innkeep_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::bulk_activity_log::{
    BulkActivityLog, BulkActivityLogFilter, CreateBulkActivityLog,
};

/// Column list for bulk_activity_logs queries.
const COLUMNS: &str = "id, service_kind, change_type, wholesaler_id, host_url, row_count, \
    process_start_at, process_end_at, duration_seconds, is_success, error_message, \
    created_at, updated_at";

/// Provides data-access methods for bulk activity logs.
pub struct BulkActivityLogRepo;

impl BulkActivityLogRepo {
    /// Open a record for an accepted batch. `process_end_at` stays NULL.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBulkActivityLog,
    ) -> Result<BulkActivityLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO bulk_activity_logs
                (service_kind, change_type, wholesaler_id, host_url, row_count, process_start_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BulkActivityLog>(&query)
            .bind(input.service_kind.as_str())
            .bind(input.change_type.as_str())
            .bind(input.wholesaler.id())
            .bind(&input.host_url)
            .bind(input.row_count)
            .bind(input.started_at)
            .fetch_one(pool)
            .await
    }

    /// Close an open record with its outcome.
    ///
    /// Only matches a record that is still open, so a record is closed at
    /// most once. Returns `None` if no open record has this id.
    pub async fn close(
        pool: &PgPool,
        id: DbId,
        started_at: Timestamp,
        ended_at: Timestamp,
        succeeded: bool,
        error_message: &str,
    ) -> Result<Option<BulkActivityLog>, sqlx::Error> {
        let query = format!(
            "UPDATE bulk_activity_logs SET
                process_end_at = $2,
                duration_seconds = $3,
                is_success = $4,
                error_message = $5
             WHERE id = $1 AND process_end_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BulkActivityLog>(&query)
            .bind(id)
            .bind(ended_at)
            .bind(duration_seconds(started_at, ended_at))
            .bind(succeeded)
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }

    /// Find a record by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BulkActivityLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bulk_activity_logs WHERE id = $1");
        sqlx::query_as::<_, BulkActivityLog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List records, newest first, optionally filtered by kind and outcome.
    pub async fn list(
        pool: &PgPool,
        filter: &BulkActivityLogFilter,
    ) -> Result<Vec<BulkActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bulk_activity_logs
             WHERE ($1::text IS NULL OR service_kind = $1)
               AND ($2::boolean IS NULL OR is_success = $2)
             ORDER BY process_start_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, BulkActivityLog>(&query)
            .bind(filter.service_kind.map(|k| k.as_str()))
            .bind(filter.is_success)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Records still open that were started before `cutoff`, oldest first.
    pub async fn list_open_started_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<BulkActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bulk_activity_logs
             WHERE process_end_at IS NULL AND process_start_at < $1
             ORDER BY process_start_at ASC"
        );
        sqlx::query_as::<_, BulkActivityLog>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Count all records.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bulk_activity_logs")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
