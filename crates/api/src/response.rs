//! Shared response envelope types for API handlers.
//!
//! Read endpoints use the `{ "data": ... }` envelope. Bulk ingest endpoints
//! add a fixed acknowledgement message alongside the receipt.

use serde::Serialize;

/// Acknowledgement text returned by every accepted bulk request.
pub const ACCEPTED_MESSAGE: &str = "Request accepted successfully!";

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": ..., "data": T }` envelope for accepted bulk batches.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse<T: Serialize> {
    pub message: &'static str,
    pub data: T,
}

impl<T: Serialize> AcceptedResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            message: ACCEPTED_MESSAGE,
            data,
        }
    }
}
