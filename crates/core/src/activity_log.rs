//! Bulk activity-log lifecycle rules (pure logic).
//!
//! A record is opened when a batch is accepted and closed exactly once when
//! its background job finishes. `is_success` is `None` while the job runs.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Prefix for error messages recorded when a processor panics.
pub const INTERNAL_FAULT_PREFIX: &str = "internal fault";

/// Derived lifecycle status of an activity-log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Running,
    Succeeded,
    Failed,
}

impl ActivityStatus {
    /// Map the tri-state `is_success` column to a status.
    pub fn from_is_success(is_success: Option<bool>) -> Self {
        match is_success {
            None => Self::Running,
            Some(true) => Self::Succeeded,
            Some(false) => Self::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Elapsed seconds between `start` and `end`, at microsecond precision.
///
/// Clock skew that puts `end` before `start` yields `0.0`.
pub fn duration_seconds(start: Timestamp, end: Timestamp) -> f64 {
    let micros = (end - start).num_microseconds().unwrap_or(i64::MAX);
    micros.max(0) as f64 / 1_000_000.0
}

/// Error text stored for a processor that panicked instead of returning.
pub fn internal_fault_message(detail: &str) -> String {
    format!("{INTERNAL_FAULT_PREFIX}: domain processor panicked: {detail}")
}
