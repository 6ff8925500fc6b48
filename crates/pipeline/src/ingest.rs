//! Bulk ingestion: synchronous acceptance, detached application.
//!
//! ```text
//! accept ── header ──> router ── body ──> validator ── open log ──> receipt
//!                                                         │
//!                                               spawn ────┘
//!                                                 │
//!                                     processor.apply(batch)
//!                                                 │
//!                                        close log (outcome)
//! ```
//!
//! The caller's acknowledgement only promises that the batch was well formed
//! and is being processed. Processing failures are visible solely through
//! the closed activity-log record.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use innkeep_core::activity_log::internal_fault_message;
use innkeep_core::bulk::{validate_payload, BulkBatch, ChangeType, ServiceKind, Wholesaler};
use innkeep_core::types::{DbId, Timestamp};
use innkeep_db::models::bulk_activity_log::CreateBulkActivityLog;
use serde::Serialize;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::error::AcceptError;
use crate::processor::DomainProcessor;
use crate::router::WholesalerRouter;
use crate::store::ActivityLogStore;

/// One inbound bulk request, borrowed from the HTTP layer.
#[derive(Debug, Clone, Copy)]
pub struct IngestRequest<'a> {
    pub service_kind: ServiceKind,
    /// Raw `x-wholesaler-id` header value, if present.
    pub wholesaler_header: Option<&'a str>,
    pub host_url: &'a str,
    pub body: &'a [u8],
}

/// Returned to the caller once a batch is accepted for processing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceReceipt {
    pub activity_log_id: DbId,
    pub service_kind: ServiceKind,
    pub change_type: ChangeType,
    pub wholesaler: Wholesaler,
    pub row_count: usize,
    pub accepted_at: Timestamp,
}

/// Orchestrates acceptance and background application of bulk batches.
///
/// Every accepted batch gets its own task; there is no queue and no
/// concurrency limit. Tasks are never cancelled and callers never receive
/// a handle. The tracker exists only so shutdown and tests can wait for
/// in-flight jobs.
pub struct BulkIngestionPipeline {
    router: WholesalerRouter,
    store: Arc<dyn ActivityLogStore>,
    tracker: TaskTracker,
}

impl BulkIngestionPipeline {
    pub fn new(router: WholesalerRouter, store: Arc<dyn ActivityLogStore>) -> Self {
        Self {
            router,
            store,
            tracker: TaskTracker::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ActivityLogStore> {
        &self.store
    }

    pub fn router(&self) -> &WholesalerRouter {
        &self.router
    }

    /// Validate, open the activity log, spawn the job, and return a receipt.
    ///
    /// Rejected input never creates a record. If the record cannot be
    /// opened, nothing is spawned.
    pub async fn accept(&self, request: IngestRequest<'_>) -> Result<AcceptanceReceipt, AcceptError> {
        let service_kind = request.service_kind;
        let (wholesaler, processor) = self
            .router
            .resolve_header(service_kind, request.wholesaler_header)?;
        let batch = validate_payload(service_kind, request.body)?;

        let started_at = Utc::now();
        let change_type = service_kind.change_type();
        let row_count = batch.len();
        let input = CreateBulkActivityLog {
            service_kind,
            change_type,
            wholesaler,
            host_url: request.host_url.to_string(),
            row_count: i32::try_from(row_count).unwrap_or(i32::MAX),
            started_at,
        };

        let activity_log_id = self
            .store
            .open(&input)
            .await
            .map_err(AcceptError::Acceptance)?;

        tracing::info!(
            activity_log_id,
            %service_kind,
            %change_type,
            %wholesaler,
            row_count,
            "Bulk batch accepted"
        );

        let job = Job {
            activity_log_id,
            started_at,
            batch,
            processor,
            store: Arc::clone(&self.store),
        };
        let span = tracing::info_span!(
            "bulk_job",
            activity_log_id,
            service_kind = %service_kind,
            wholesaler = %wholesaler
        );
        self.tracker.spawn(job.run().instrument(span));

        Ok(AcceptanceReceipt {
            activity_log_id,
            service_kind,
            change_type,
            wholesaler,
            row_count,
            accepted_at: started_at,
        })
    }

    /// Number of jobs currently running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every job spawned so far has closed its record.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Wait for in-flight jobs for at most `timeout`.
    ///
    /// Returns `false` if jobs were still running when the timeout elapsed;
    /// their records stay open.
    pub async fn drain(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_idle()).await.is_ok()
    }
}

impl std::fmt::Debug for BulkIngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkIngestionPipeline")
            .field("router", &self.router)
            .field("in_flight", &self.tracker.len())
            .finish()
    }
}

/// A single accepted batch, owned by its background task.
struct Job {
    activity_log_id: DbId,
    started_at: Timestamp,
    batch: BulkBatch,
    processor: Arc<dyn DomainProcessor>,
    store: Arc<dyn ActivityLogStore>,
}

impl Job {
    async fn run(self) {
        tracing::debug!(row_count = self.batch.len(), "Bulk job started");

        let outcome = AssertUnwindSafe(self.processor.apply(&self.batch))
            .catch_unwind()
            .await;

        let (succeeded, error_message) = match outcome {
            Ok(Ok(())) => (true, String::new()),
            Ok(Err(e)) => (false, e.to_string()),
            Err(panic) => (false, internal_fault_message(&panic_detail(panic.as_ref()))),
        };

        match self
            .store
            .close(self.activity_log_id, self.started_at, succeeded, &error_message)
            .await
        {
            Ok(Some(record)) if succeeded => {
                tracing::info!(
                    duration_seconds = record.duration_seconds,
                    "Bulk job succeeded"
                );
            }
            Ok(Some(record)) => {
                tracing::warn!(
                    duration_seconds = record.duration_seconds,
                    error = %error_message,
                    "Bulk job failed"
                );
            }
            Ok(None) => {
                tracing::warn!(
                    succeeded,
                    error = %error_message,
                    "Bulk job finished but no open activity log matched"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    succeeded,
                    job_error = %error_message,
                    "Failed to close activity log"
                );
            }
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
