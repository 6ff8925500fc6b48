//! Domain processors: the components that apply a validated batch.
//!
//! The pipeline treats a processor as opaque. It runs one call per job and
//! records the whole batch as failed on any `Err`, whatever the processor
//! may already have written.

use async_trait::async_trait;
use innkeep_core::bulk::{BulkBatch, ChangeType, ServiceKind, Wholesaler};
use innkeep_db::models::bulk_staged_row::NewStagedRow;
use innkeep_db::repositories::BulkStagedRowRepo;
use innkeep_db::DbPool;
use serde::Serialize;

use crate::error::ProcessError;

#[async_trait]
pub trait DomainProcessor: Send + Sync {
    /// Apply the whole batch, or report why it could not be applied.
    async fn apply(&self, batch: &BulkBatch) -> Result<(), ProcessError>;
}

/// Lands validated rows in `bulk_staged_rows` for one (domain, wholesaler).
///
/// The batch is written in a single transaction, so a failure leaves no
/// partial rows behind. Master batches replace the staged rows of every
/// property they mention; differential batches upsert by natural key.
#[derive(Debug, Clone)]
pub struct StagingProcessor {
    pool: DbPool,
    service_kind: ServiceKind,
    wholesaler: Wholesaler,
}

impl StagingProcessor {
    pub fn new(pool: DbPool, service_kind: ServiceKind, wholesaler: Wholesaler) -> Self {
        Self {
            pool,
            service_kind,
            wholesaler,
        }
    }
}

#[async_trait]
impl DomainProcessor for StagingProcessor {
    async fn apply(&self, batch: &BulkBatch) -> Result<(), ProcessError> {
        if batch.service_kind() != self.service_kind {
            return Err(ProcessError::rejected(format!(
                "{} batch routed to {} processor",
                batch.service_kind(),
                self.service_kind
            )));
        }
        if batch.is_empty() {
            tracing::debug!("Empty batch, nothing to stage");
            return Ok(());
        }

        let rows = staged_rows(batch)
            .map_err(|e| ProcessError::rejected(format!("failed to encode row: {e}")))?;

        let written = BulkStagedRowRepo::apply(
            &self.pool,
            self.wholesaler.id(),
            self.service_kind.as_str(),
            self.service_kind.change_type() == ChangeType::Master,
            &batch.property_codes(),
            &rows,
        )
        .await?;

        tracing::info!(
            wholesaler = %self.wholesaler,
            service_kind = %self.service_kind,
            written,
            "Staged bulk rows"
        );
        Ok(())
    }
}

/// Convert a batch into staging rows keyed by property and entity key.
pub fn staged_rows(batch: &BulkBatch) -> Result<Vec<NewStagedRow>, serde_json::Error> {
    fn convert<T: Serialize>(
        rows: &[T],
        key: impl Fn(&T) -> (String, String),
    ) -> Result<Vec<NewStagedRow>, serde_json::Error> {
        rows.iter()
            .map(|row| {
                let (property_code, entity_key) = key(row);
                Ok(NewStagedRow {
                    property_code,
                    entity_key,
                    payload: serde_json::to_value(row)?,
                })
            })
            .collect()
    }

    match batch {
        BulkBatch::Room(rows) => convert(rows, |r| (r.property().to_string(), r.entity_key())),
        BulkBatch::Plan(rows) => convert(rows, |r| (r.property().to_string(), r.entity_key())),
        BulkBatch::Price(rows) => convert(rows, |r| (r.property().to_string(), r.entity_key())),
        BulkBatch::Stock(rows) => convert(rows, |r| (r.property().to_string(), r.entity_key())),
    }
}
