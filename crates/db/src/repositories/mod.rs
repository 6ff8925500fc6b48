//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod bulk_activity_log_repo;
pub mod bulk_staged_row_repo;

pub use bulk_activity_log_repo::BulkActivityLogRepo;
pub use bulk_staged_row_repo::BulkStagedRowRepo;
