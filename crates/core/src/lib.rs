//! Innkeep core domain types.
//!
//! Pure logic only: no database or HTTP dependencies. The bulk-ingestion
//! vocabulary (service kinds, wholesalers, row shapes) and the payload
//! validator live here so every other crate agrees on them.

pub mod activity_log;
pub mod bulk;
pub mod error;
pub mod pagination;
pub mod types;
