//! Asynchronous bulk-ingestion pipeline.
//!
//! A wholesaler feed is validated and acknowledged synchronously, then
//! applied by a detached background task whose outcome lands in the
//! `bulk_activity_logs` audit trail.
//!
//! - [`router::WholesalerRouter`] maps (domain, wholesaler) to a processor.
//! - [`store::ActivityLogStore`] opens and closes audit records.
//! - [`ingest::BulkIngestionPipeline`] ties them together.

pub mod error;
pub mod ingest;
pub mod processor;
pub mod router;
pub mod store;

pub use error::{AcceptError, ProcessError, RouteError, StoreError};
pub use ingest::{AcceptanceReceipt, BulkIngestionPipeline, IngestRequest};
pub use processor::{DomainProcessor, StagingProcessor};
pub use router::WholesalerRouter;
pub use store::{ActivityLogStore, MemoryActivityLogStore, PgActivityLogStore};
